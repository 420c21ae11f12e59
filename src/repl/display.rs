//! Terminal output for the CLI and chat REPL
//!
//! Spinners while waiting on providers, color-coded sentiment, and
//! formatted replies, search results and analytics.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::analytics::{AnalyticsOverview, RecentQuery};
use crate::repl::commands::help_lines;
use crate::sentiment::is_high_priority;
use crate::service::ChatReply;
use crate::types::{RetrievedDocument, SentimentLabel, SentimentVerdict};

/// Display manager for terminal UI
pub struct DisplayManager {
    show_progress: bool,
    show_details: bool,
    tick_interval: Duration,
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl DisplayManager {
    pub fn new(show_progress: bool, show_details: bool) -> Self {
        DisplayManager {
            show_progress,
            show_details,
            tick_interval: Duration::from_millis(100),
        }
    }

    /// Show welcome banner
    pub fn show_banner(&self, version: &str, model: &str, index: &str) {
        let width = 64;
        let rule = "=".repeat(width);
        let title = format!("  SentiFlow {} - Customer Support Assistant", version);
        let info = format!("  Model: {} | Knowledge base: {}", model, index);

        println!("\n{}", rule.cyan());
        println!("{}", title.bold().cyan());
        println!("{}", info.dimmed());
        println!("{}\n", rule.cyan());
        println!(
            "Type your message (or {} for commands, {} to quit)\n",
            "/help".green(),
            "/exit".green()
        );
    }

    /// Start a spinner; hidden when progress output is disabled
    pub fn spinner(&self, message: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(self.tick_interval);
        pb
    }

    /// Print a generated reply with sentiment, sources and model
    pub fn show_reply(&self, reply: &ChatReply) {
        println!("\n{}\n", reply.response);
        println!("{} {}", "Sentiment:".dimmed(), format_verdict(&reply.sentiment));

        if !reply.sources.is_empty() {
            let sources: Vec<String> = reply
                .sources
                .iter()
                .map(|s| format!("{} ({})", s.title, s.source))
                .collect();
            println!("{} {}", "Sources:".dimmed(), sources.join(", "));
        }

        if self.show_details {
            println!(
                "{} {} | {} documents",
                "Model:".dimmed(),
                reply.model_used,
                reply.num_documents
            );
        }
        println!();
    }

    /// Print a standalone sentiment verdict
    pub fn show_verdict(&self, verdict: &SentimentVerdict) {
        println!("{} {}", "Sentiment:".bold(), format_verdict(verdict));
        println!("  Score:      {:.2}", verdict.score);
        println!("  Emotion:    {}", verdict.emotion);
        println!("  Confidence: {:.2}", verdict.confidence);
        if is_high_priority(verdict) {
            println!("  {}", "High priority".red().bold());
        }
    }

    /// Print ranked search results
    pub fn show_documents(&self, documents: &[RetrievedDocument]) {
        if documents.is_empty() {
            println!("{}", "No documents found.".yellow());
            return;
        }

        for (i, doc) in documents.iter().enumerate() {
            println!(
                "{}. {} {}",
                i + 1,
                doc.title_or_default().bold(),
                format!("(score {:.3})", doc.score).dimmed()
            );
            let mut meta = vec![doc.source_or_default().to_string()];
            if let Some(category) = &doc.category {
                meta.push(category.clone());
            }
            println!("   {}", meta.join(" | ").dimmed());
            println!("   {}\n", doc.snippet);
        }
    }

    /// Print analytics overview
    pub fn show_overview(&self, overview: &AnalyticsOverview) {
        let dist = &overview.sentiment_distribution;
        println!("\n{}", "Sentiment Analytics".bold());
        println!("─────────────────────────────────────");
        println!("Total queries:     {}", overview.total_queries);
        println!("Average score:     {:.2}", overview.avg_sentiment_score);
        for label in SentimentLabel::ALL {
            println!("  {:<16} {}", colorize_label(label), dist.get(label));
        }
        println!();
    }

    /// Print recent queries, newest first
    pub fn show_recent(&self, recent: &[RecentQuery]) {
        if recent.is_empty() {
            println!("{}", "No messages yet.".dimmed());
            return;
        }
        for query in recent {
            println!(
                "{} {:<12} {}",
                query.timestamp.format("%H:%M:%S").to_string().dimmed(),
                colorize_label(query.sentiment),
                query.message
            );
        }
    }

    pub fn show_help(&self) {
        println!("\n{}", "Commands:".bold());
        for (name, description) in help_lines() {
            println!("  {:<14} {}", name.cyan(), description);
        }
        println!();
    }

    /// Display info message
    pub fn show_info(&self, message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Display success message
    pub fn show_success(&self, message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Display warning message
    pub fn show_warning(&self, warning: &str) {
        println!("{} {}", "Warning:".yellow().bold(), warning.yellow());
    }

    /// Display error message
    pub fn show_error(&self, error: &str) {
        eprintln!("{} {}", "Error:".red().bold(), error.red());
    }
}

fn format_verdict(verdict: &SentimentVerdict) -> String {
    format!(
        "{} ({}, {:.0}% confident)",
        colorize_label(verdict.label),
        verdict.emotion,
        verdict.confidence * 100.0
    )
}

fn colorize_label(label: SentimentLabel) -> ColoredString {
    match label {
        SentimentLabel::Positive => label.as_str().green(),
        SentimentLabel::Neutral => label.as_str().normal(),
        SentimentLabel::Negative => label.as_str().yellow(),
        SentimentLabel::Frustrated | SentimentLabel::Urgent => label.as_str().red().bold(),
    }
}
