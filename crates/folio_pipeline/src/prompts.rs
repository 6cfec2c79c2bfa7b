//! Per-stage prompt builders.
//!
//! Prompts that expect structured output always spell out the JSON shape and
//! ask for a single object; the extraction contract still treats the result
//! as untrusted.

use crate::TemplateGuidance;
use folio_core::{Outline, ResearchBundle, ResearchDepth, Statistic, Tone};

pub(crate) fn research_prompt(topic: &str, keywords: &[String], depth: ResearchDepth) -> String {
    let keyword_list = if keywords.is_empty() {
        "none provided".to_string()
    } else {
        keywords.join(", ")
    };

    format!(
        "You are a research analyst preparing a thought-leadership report.\n\
         Research the topic \"{topic}\" ({depth} depth). Related keywords: {keyword_list}.\n\n\
         Respond with ONLY a single JSON object of this shape:\n\
         {{\n\
           \"key_findings\": [\"...\"],\n\
           \"statistics\": [{{\"value\": \"73%\", \"context\": \"...\", \"source\": \"...\", \"category\": \"...\", \"highlight_worthy\": true, \"visualization_type\": \"percentage\"}}],\n\
           \"trends\": [\"...\"],\n\
           \"challenges\": [\"...\"],\n\
           \"opportunities\": [\"...\"],\n\
           \"expert_perspectives\": [\"...\"],\n\
           \"recommended_sources\": [\"...\"]\n\
         }}"
    )
}

pub(crate) fn industry_prompt(industry: &str, topic: &str) -> String {
    format!(
        "Analyze the {industry} industry as context for a report on \"{topic}\".\n\n\
         Respond with ONLY a single JSON object:\n\
         {{\n\
           \"industry\": \"{industry}\",\n\
           \"overview\": \"...\",\n\
           \"trends\": [\"...\"],\n\
           \"challenges\": [\"...\"],\n\
           \"opportunities\": [\"...\"],\n\
           \"regulatory_landscape\": \"...\",\n\
           \"competitive_dynamics\": \"...\",\n\
           \"outlook\": \"...\"\n\
         }}"
    )
}

pub(crate) fn outline_prompt(
    topic: &str,
    research: &ResearchBundle,
    guidance: &TemplateGuidance,
) -> String {
    let findings = bullet_list(&research.key_findings, 5);
    let statistics: Vec<String> = research
        .statistics
        .iter()
        .take(5)
        .map(|s| format!("- {} ({})", s.value, s.context))
        .collect();
    let trends = bullet_list(&research.trends, 3);
    let required = if guidance.required_sections.is_empty() {
        "none".to_string()
    } else {
        guidance.required_sections.join(", ")
    };
    let mut steering = String::new();
    if !guidance.services.is_empty() {
        steering.push_str(&format!(
            "Position these services where relevant: {}.\n",
            guidance.services.join(", ")
        ));
    }
    if let Some(direction) = &guidance.custom_direction {
        steering.push_str(&format!("Direction from the client: {}\n", direction));
    }

    format!(
        "Plan a long-form thought-leadership document on \"{topic}\".\n\n\
         Key findings:\n{findings}\n\
         Statistics:\n{stats}\n\
         Trends:\n{trends}\n\n\
         Style: {style}. Target length: about {pages} pages. Required sections: {required}.\n\
         {steering}\
         Produce 6-10 top-level sections.\n\n\
         Respond with ONLY a single JSON object:\n\
         {{\n\
           \"title\": \"...\",\n\
           \"subtitle\": \"...\",\n\
           \"executive_summary\": {{\"key_points\": [\"...\"], \"word_count\": 250}},\n\
           \"sections\": [{{\"id\": \"section-1\", \"title\": \"...\", \"purpose\": \"...\", \"word_count\": 400, \"subsections\": [{{\"id\": \"section-1-1\", \"title\": \"...\", \"key_points\": [\"...\"], \"word_count\": 200, \"include_statistics\": false, \"include_chart\": false}}]}}],\n\
           \"conclusion\": {{\"key_points\": [\"...\"], \"word_count\": 300}}\n\
         }}",
        stats = statistics.join("\n"),
        style = guidance.style,
        pages = guidance.target_pages,
    )
}

pub(crate) fn refine_prompt(outline: &Outline, feedback: &str) -> String {
    let current = serde_json::to_string_pretty(outline).unwrap_or_default();
    format!(
        "Refine this document outline according to the feedback. Keep the same JSON shape.\n\n\
         Current outline:\n{current}\n\n\
         Feedback: {feedback}\n\n\
         Respond with ONLY the revised JSON object."
    )
}

pub(crate) fn section_prompt(
    title: &str,
    topic: &str,
    key_points: &[String],
    statistics: &[String],
    tone: Tone,
    target_word_count: u32,
) -> String {
    let mut prompt = format!(
        "Write the \"{title}\" section of a thought-leadership document on \"{topic}\".\n\
         Write in {descriptor}. Target length: about {target_word_count} words.\n",
        descriptor = tone.descriptor(),
    );
    if !key_points.is_empty() {
        prompt.push_str(&format!("Cover these points:\n{}\n", bullet_list(key_points, 8)));
    }
    if !statistics.is_empty() {
        prompt.push_str(&format!(
            "Weave in these statistics where they fit naturally:\n{}\n",
            bullet_list(statistics, 3)
        ));
    }
    prompt.push_str("Respond with the section prose only, no headings or preamble.");
    prompt
}

pub(crate) fn summary_prompt(
    title: &str,
    topic: &str,
    key_points: &[String],
    tone: Tone,
    target_word_count: u32,
) -> String {
    format!(
        "Write the executive summary for \"{title}\", a thought-leadership document on \"{topic}\".\n\
         Write in {descriptor}. Target length: about {target_word_count} words.\n\
         Cover:\n{points}\n\
         Respond with the summary prose only.",
        descriptor = tone.descriptor(),
        points = bullet_list(key_points, 6),
    )
}

pub(crate) fn conclusion_prompt(
    title: &str,
    key_points: &[String],
    tone: Tone,
    target_word_count: u32,
) -> String {
    format!(
        "Write the conclusion for \"{title}\". Write in {descriptor}.\n\
         Target length: about {target_word_count} words. Cover:\n{points}\n\
         End with a single-sentence call to action as the final paragraph.\n\
         Respond with the conclusion prose only.",
        descriptor = tone.descriptor(),
        points = bullet_list(key_points, 6),
    )
}

pub(crate) fn statistics_prompt(content_excerpt: &str, known: &[Statistic]) -> String {
    let known_lines: Vec<String> = known
        .iter()
        .take(10)
        .map(|s| format!("- {} ({})", s.value, s.context))
        .collect();

    format!(
        "Extract 5-15 quantitative statistics from this document excerpt. Include the\n\
         statistics below when they appear or strengthen the document.\n\n\
         Known statistics:\n{known}\n\n\
         Document excerpt:\n{content_excerpt}\n\n\
         Respond with ONLY a single JSON object:\n\
         {{\"statistics\": [{{\"value\": \"73%\", \"context\": \"...\", \"source\": \"...\", \"category\": \"...\", \"highlight_worthy\": true, \"visualization_type\": \"percentage\"}}]}}",
        known = known_lines.join("\n"),
    )
}

fn bullet_list(items: &[String], max: usize) -> String {
    let lines: Vec<String> = items.iter().take(max).map(|i| format!("- {}", i)).collect();
    if lines.is_empty() {
        "- (none)".to_string()
    } else {
        lines.join("\n")
    }
}
