//! CLI output formatting utilities

use crate::clustering::ClusteringReport;
use crate::models::HistoryEntry;
use crate::rag::AnswerResult;

/// Safely truncate a string at character boundary (not byte boundary)
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Print a generated answer with its retrieval stats
pub fn print_answer(result: &AnswerResult) {
    println!("\n💬 Answer:\n");
    println!("{}", result.answer_text);
    println!();
    println!("⏱️  Latency: {:.2} ms", result.latency_ms());
    println!("📚 Chunks used: {}", result.num_chunks_retrieved);
    match result.average_retrieval_distance {
        Some(d) => println!("📏 Average distance: {d:.4}"),
        None => println!("📏 Average distance: N/A"),
    }
}

/// Print a user's history
pub fn print_history(username: &str, entries: &[HistoryEntry]) {
    println!("📜 History for {username}: {} entries", entries.len());
    for entry in entries {
        println!(
            "  - [{}] {} | {:.0} ms | {} chunks | cluster: {}",
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            truncate_str(&entry.question, 80),
            entry.latency_ms,
            entry.num_chunks,
            entry
                .cluster
                .map_or_else(|| "-".to_string(), |c| c.to_string()),
        );
        println!("      {}", truncate_str(&entry.answer, 120));
    }
}

/// Print a clustering report
pub fn print_clustering_report(report: &ClusteringReport) {
    if report.questions == 0 {
        print_warning(&format!(
            "Not enough questions to form {} clusters; nothing was labelled",
            report.clusters
        ));
        return;
    }

    print_success(&format!(
        "Labelled {} questions into {} clusters",
        report.questions, report.clusters
    ));
    for (label, size) in report.sizes.iter().enumerate() {
        println!("  - cluster {label}: {size} questions");
    }
}

pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    println!("❌ {msg}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_str("héllo wörld", 5), "héllo...");
        assert_eq!(truncate_str("short", 10), "short");
    }
}
