use std::fmt::Write;

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use nb_core::dates::{format_display, sort_oldest_first};
use nb_core::{Article, BriefingHistory, DateRange, Frequency, NewsSearch, Result};

use crate::manager::BriefingManager;

#[derive(Args, Debug, Clone)]
pub struct BriefingArgs {
    #[command(subcommand)]
    pub command: BriefingCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum BriefingCommands {
    /// Create a briefing config; it becomes active once it has topics
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Topic to follow (repeatable)
        #[arg(long = "topic")]
        topics: Vec<String>,
        #[arg(long, value_enum, default_value_t = Frequency::Daily)]
        frequency: Frequency,
    },
    /// List briefing configs
    List,
    /// Generate a briefing from a stored config
    Generate { config_id: String },
    /// Show the most recent briefing
    Latest {
        #[arg(long)]
        config_id: Option<String>,
    },
    /// List past briefings
    History,
    /// Delete a stored briefing
    DeleteBriefing { id: String },
    /// Search articles on a topic (defaults to the last week)
    Search {
        topic: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Also summarize the results
        #[arg(long)]
        summarize: bool,
    },
    /// List past searches
    Searches,
    /// Delete a stored search
    DeleteSearch { id: String },
    /// Summarize a single article
    Summarize { url: String },
}

fn render_articles(out: &mut String, articles: &[Article], bullets: impl Fn(&str) -> Vec<String>) {
    let mut articles = articles.to_vec();
    sort_oldest_first(&mut articles);
    for article in &articles {
        let _ = writeln!(out, "• {} ({})", article.title, format_display(&article.published_at));
        let _ = writeln!(out, "  {}", article.url);
        for bullet in bullets(&article.url) {
            let _ = writeln!(out, "    - {}", bullet);
        }
    }
}

/// Articles grouped by topic, oldest first, then the topic summaries.
pub fn render_briefing(history: &BriefingHistory) -> String {
    let mut out = String::new();
    for group in history.articles_by_topic() {
        let _ = writeln!(out, "## {}", group.topic);
        render_articles(&mut out, &group.articles, |url| {
            history.summary.article_map.get(url).map(<[String]>::to_vec).unwrap_or_default()
        });
        out.push('\n');
    }
    let _ = write!(out, "Summary:\n{}", history.summary.summary);
    out
}

pub fn render_search(search: &NewsSearch) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "## {} ({} to {}): {} articles",
        search.topic,
        search.start_date,
        search.end_date,
        search.articles.len()
    );
    render_articles(&mut out, &search.articles, |_| Vec::new());
    if let Some(summary) = &search.overall_summary {
        let _ = write!(out, "\nSummary:\n{}", summary);
    }
    out.trim_end().to_string()
}

pub async fn handle_command(args: BriefingArgs, manager: &BriefingManager, user_id: &str) -> Result<()> {
    match args.command {
        BriefingCommands::Create { name, description, topics, frequency } => {
            let mut config = manager.create_config(user_id, &name, description.as_deref()).await?;
            config.frequency = frequency;
            for topic in &topics {
                config.add_topic(topic, !nb_core::types::SUGGESTED_TOPICS.contains(&topic.trim()));
            }
            if !config.topics.is_empty() {
                config = manager.save_config(&config).await?;
            }
            println!("Created {} ({})", config.name, config.id.as_deref().unwrap_or("-"));
        }
        BriefingCommands::List => {
            for config in manager.list_configs(user_id).await? {
                let topics = config.topic_names().collect::<Vec<_>>().join(", ");
                let state = if config.is_active { "active" } else { "inactive" };
                println!(
                    "{} {} [{}, {}] {}",
                    config.id.as_deref().unwrap_or("-"),
                    config.name,
                    config.frequency,
                    state,
                    topics
                );
            }
        }
        BriefingCommands::Generate { config_id } => {
            let briefing = manager.generate_by_id(user_id, &config_id).await?;
            if briefing.is_empty() {
                println!("No articles found for this briefing.");
            } else if let Some(history) = &briefing.history {
                println!("{}", render_briefing(history));
            } else {
                println!("{}", briefing.summary());
            }
        }
        BriefingCommands::Latest { config_id } => {
            match manager.latest_briefing(user_id, config_id.as_deref()).await? {
                Some(history) => println!("{}", render_briefing(&history)),
                None => println!("No briefings yet."),
            }
        }
        BriefingCommands::History => {
            for history in manager.briefing_history(user_id).await? {
                let created = history.created_at.map(|at| at.format("%d-%m-%Y %H:%M").to_string());
                println!(
                    "{} {} {} articles",
                    history.id.as_deref().unwrap_or("-"),
                    created.unwrap_or_default(),
                    history.articles.len()
                );
            }
        }
        BriefingCommands::DeleteBriefing { id } => {
            manager.delete_briefing(user_id, &id).await?;
            println!("Deleted briefing {}", id);
        }
        BriefingCommands::Search { topic, start, end, summarize } => {
            let default = DateRange::current(Frequency::Weekly);
            let start = start.unwrap_or(default.start);
            let end = end.unwrap_or(default.end);
            let mut search = manager.search(user_id, &topic, start, end).await?;
            if summarize && !search.articles.is_empty() {
                let parsed = manager.summarize_search(user_id, &search.articles).await?;
                search.overall_summary = Some(parsed.overall_summary);
            }
            println!("{}", render_search(&search));
        }
        BriefingCommands::Searches => {
            for search in manager.search_history(user_id).await? {
                println!("{} {}", search.id.as_deref().unwrap_or("-"), render_search(&search).lines().next().unwrap_or_default());
            }
        }
        BriefingCommands::DeleteSearch { id } => {
            manager.delete_search(user_id, &id).await?;
            println!("Deleted search {}", id);
        }
        BriefingCommands::Summarize { url } => {
            println!("{}", manager.summarize_article(&url).await);
        }
    }
    Ok(())
}
