//! `interlude agent`: assemble the data agent and report what a user sees.

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use tracing::Instrument;

use interlude_infra::agent::assemble_agent;
use interlude_observe::genai_attrs::{OP_INVOKE_AGENT, span_name};
use interlude_types::agent::{AgentInventory, RequestContext};
use interlude_types::config::InterludeConfig;

pub async fn show_agent(config: &InterludeConfig, as_email: Option<&str>, json: bool) -> Result<()> {
    let span = tracing::info_span!(
        "agent.describe",
        otel.name = %span_name(OP_INVOKE_AGENT, &config.llm.model),
    );
    let inventory = async {
        let agent = assemble_agent(config).context("failed to assemble agent")?;
        let ctx = match as_email {
            Some(email) => {
                RequestContext::default().with_cookie(&config.agent.users.cookie_name, email)
            }
            None => RequestContext::default(),
        };
        let user = agent.resolve_user(&ctx).await;
        anyhow::Ok(agent.describe(&user).await)
    }
    .instrument(span)
    .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&inventory)?);
        return Ok(());
    }

    print_inventory(&inventory);
    Ok(())
}

fn print_inventory(inventory: &AgentInventory) {
    println!();
    println!(
        "  {} Agent for {} ({})",
        style("🤖").bold(),
        style(&inventory.user.email).cyan(),
        inventory.user.group_memberships.join(", ")
    );
    println!();

    println!("  {}", style("── LLM ──").dim());
    println!("  Provider:        {}", inventory.provider);
    println!("  Model:           {}", style(&inventory.model).bold());
    println!("  Tool iterations: {}", inventory.max_tool_iterations);
    println!();

    println!("  {}", style("── Memory ──").dim());
    println!(
        "  Embeddings: {} ({} dims)",
        inventory.embedding_model,
        if inventory.embedding_dimension == 0 {
            "?".to_string()
        } else {
            inventory.embedding_dimension.to_string()
        }
    );
    println!(
        "  Items:      {} / {}",
        inventory.memory_len, inventory.memory_max_items
    );
    println!();

    println!("  {}", style("── Tools ──").dim());
    println!("{}", tools_table(inventory));
    if !inventory.hidden_tools.is_empty() {
        println!(
            "  {} {}",
            style("Not available to this user:").yellow(),
            inventory.hidden_tools.join(", ")
        );
    }
    println!();
}

fn tools_table(inventory: &AgentInventory) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Tool").fg(Color::White),
        Cell::new("Access groups").fg(Color::White),
        Cell::new("Description").fg(Color::White),
    ]);

    for tool in &inventory.tools {
        let groups = if tool.access_groups.is_empty() {
            "(everyone)".to_string()
        } else {
            tool.access_groups.join(", ")
        };
        table.add_row(vec![
            Cell::new(&tool.name).fg(Color::Cyan),
            Cell::new(groups),
            Cell::new(&tool.description),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use interlude_types::agent::{ToolSummary, User};

    fn inventory() -> AgentInventory {
        AgentInventory {
            user: User {
                id: "guest@example.com".to_string(),
                email: "guest@example.com".to_string(),
                group_memberships: vec!["user".to_string()],
            },
            provider: "openai_compatible".to_string(),
            model: "gpt-4o-mini".to_string(),
            embedding_model: "local-hash".to_string(),
            embedding_dimension: 256,
            memory_max_items: 1000,
            memory_len: 0,
            max_tool_iterations: 100,
            tools: vec![
                ToolSummary {
                    name: "save_text_memory".to_string(),
                    description: "Save a note.".to_string(),
                    access_groups: vec!["admin".to_string(), "user".to_string()],
                    parameters: serde_json::json!({"type": "object"}),
                },
                ToolSummary {
                    name: "visualize_data".to_string(),
                    description: "Chart rows.".to_string(),
                    access_groups: Vec::new(),
                    parameters: serde_json::json!({"type": "object"}),
                },
            ],
            hidden_tools: vec!["save_question_tool_args".to_string()],
        }
    }

    #[test]
    fn test_tools_table_lists_visible_tools() {
        let rendered = tools_table(&inventory()).to_string();
        assert!(rendered.contains("save_text_memory"));
        assert!(rendered.contains("admin, user"));
        assert!(rendered.contains("(everyone)"));
        assert!(!rendered.contains("save_question_tool_args"));
    }

    #[tokio::test]
    async fn test_show_agent_json_with_default_config() {
        show_agent(&InterludeConfig::default(), Some("admin@example.com"), true)
            .await
            .unwrap();
    }
}
