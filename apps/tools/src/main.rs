use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use catalog::Catalog;
use clap::{Parser, Subcommand};
use shared::protocol::{Command as Navigation, Screen, ScreenBody};
use storefront::{Presentation, Router, Transition};

#[derive(Parser, Debug)]
struct Cli {
    /// Catalog file; the built-in catalog is used when omitted.
    #[arg(long)]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a catalog file and print a summary.
    Validate,
    /// Print every category and product with its interaction token.
    List,
    /// Show the screen a token would produce.
    Render { token: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let catalog = match &cli.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin()?,
    };

    match cli.command {
        Command::Validate => {
            println!(
                "catalog ok: {} categories, {} products",
                catalog.len(),
                catalog.product_count()
            );
        }
        Command::List => {
            for category in catalog.categories() {
                let token = Navigation::ShowCategory(category.key.clone());
                println!("{}  {token}", category.name);
                for product in &category.products {
                    let token = Navigation::ShowProduct {
                        category: category.key.clone(),
                        product: product.key.clone(),
                    };
                    println!("    {}  {}  {token}", product.name, product.price);
                }
            }
        }
        Command::Render { token } => {
            let router = Router::new(Arc::new(catalog), Presentation::default());
            match router.handle_token(&token) {
                Transition::Edit(screen) => print_screen("edit in place", &screen),
                Transition::Replace(screen) => print_screen("send new, delete origin", &screen),
                Transition::Acknowledge => println!("acknowledged, nothing rendered"),
                Transition::Ignore => println!("ignored"),
            }
        }
    }

    Ok(())
}

fn print_screen(delivery: &str, screen: &Screen) {
    println!("[{delivery}] {:?}", screen.kind);
    if let ScreenBody::Photo { image, .. } = &screen.body {
        println!("image: {image}");
    }
    println!("{}", screen.text_body());
    for button in screen.keyboard.buttons() {
        println!("  [{}] -> {}", button.label, button.token());
    }
}
