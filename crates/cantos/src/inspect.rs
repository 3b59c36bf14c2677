use std::path::PathBuf;

use cantos_core::classify::{classify, ClassifiedPage, Role};
use colored::Colorize;

use crate::config::{load_layout, LayoutArgs};
use crate::prelude::{println, *};

#[derive(Debug, clap::Parser)]
#[command(name = "inspect")]
#[command(about = "Show how the classifier sees a single page")]
pub struct App {
    /// Path to the hymnal PDF
    #[arg(env = "CANTOS_PDF")]
    pub pdf: PathBuf,

    /// Page to inspect (1-based)
    #[arg(short, long)]
    pub page: u32,

    /// Print the classified page as JSON
    #[arg(long)]
    pub json: bool,

    #[clap(flatten)]
    pub layout: LayoutArgs,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let layout = load_layout(global.config.as_deref(), &app.layout)?;
    let doc = crate::source::open(&app.pdf)?;

    let text = doc
        .page(app.page)
        .wrap_err_with(|| f!("Failed to decode page {}", app.page))?;
    let page = crate::source::to_page(text);
    let classified = classify(&page, &layout);

    let document = crate::source::describe_document(&doc.metadata());

    if app.json {
        let json = serde_json::to_string_pretty(&classified)
            .map_err(|e| eyre!("Failed to serialize output: {}", e))?;
        println!("{}", json);
        return Ok(());
    }

    println!("\n{}", document.bold());
    print_page(&classified);
    Ok(())
}

fn role_label(role: Role) -> colored::ColoredString {
    match role {
        Role::NumberLabel => "number".bright_magenta(),
        Role::Title => "title".bright_green(),
        Role::Body => "body".bright_white(),
        Role::Ignored => "ignored".dimmed(),
    }
}

fn print_page(page: &ClassifiedPage) {
    let label = page
        .number_label
        .map(|n| n.to_string())
        .unwrap_or_else(|| "-".to_string());
    let title = page.title.as_deref().unwrap_or("-");

    println!("\nPage {}", page.number.to_string().bold());
    println!("  number label: {}", label.bright_yellow());
    println!("  title:        {}\n", title.bright_green());

    let mut table = new_table();
    table.add_row(prettytable::row![
        "Block".bold().cyan(),
        "Size".bold().cyan(),
        "Y".bold().cyan(),
        "Role".bold().cyan(),
        "Text".bold().cyan()
    ]);

    for (index, block) in page.blocks.iter().enumerate() {
        for line in block {
            table.add_row(prettytable::row![
                index.to_string(),
                f!("{:.1}", line.size),
                f!("{:.1}", line.y),
                role_label(line.role),
                line.text
            ]);
        }
    }

    table.printstd();
}
