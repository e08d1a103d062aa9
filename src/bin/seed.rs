//! Seeds demo portfolio content for one owner.
//!
//! Re-running is safe: projects are matched by title and links by name, and
//! existing records are updated in place.

use portfolio_cms::domain::{OwnerId, PersonalInfoPayload, ProjectPayload, SocialLinkPayload};
use portfolio_cms::infra::{Config, StorageBackend};
use portfolio_cms::storage::{ItemStore, MemoryItemStore, PostgresItemStore};
use portfolio_cms::{OrderedCollectionManager, PortfolioService};
use std::sync::Arc;

fn usage_and_exit() -> ! {
    eprintln!("Usage: cargo run --bin seed -- [--owner <id>]   (default owner: 1)");
    std::process::exit(2);
}

fn parse_owner(args: &[String]) -> anyhow::Result<OwnerId> {
    match args.iter().position(|a| a == "--owner") {
        Some(i) => {
            let raw = args
                .get(i + 1)
                .ok_or_else(|| anyhow::anyhow!("--owner needs a value"))?;
            raw.parse()
                .map_err(|e| anyhow::anyhow!("--owner must be an integer: {}", e))
        }
        None => Ok(1),
    }
}

fn personal_info() -> PersonalInfoPayload {
    PersonalInfoPayload {
        name: "Elie Saade".to_string(),
        title: "Full Stack Developer".to_string(),
        description: "I design and develop beautiful, functional websites and applications that deliver exceptional user experiences.".to_string(),
        about_content: "I am a passionate full stack developer with expertise in Laravel, React, and Tailwind CSS. With a strong foundation in both frontend and backend technologies, I create scalable, responsive, and user-friendly web applications.".to_string(),
        email: "your.email@example.com".to_string(),
        phone: "+1 234 567 8900".to_string(),
    }
}

fn project(n: u8, title: &str, description: &str, tags: &[&str], is_featured: bool) -> ProjectPayload {
    ProjectPayload {
        title: title.to_string(),
        description: description.to_string(),
        image: Some(format!("/images/project{}.jpg", n)),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        demo_url: Some(if n == 1 {
            "https://example.com/demo".to_string()
        } else {
            format!("https://example.com/demo{}", n)
        }),
        repo_url: Some(format!("https://github.com/yourusername/project{}", n)),
        is_featured,
    }
}

fn projects() -> Vec<ProjectPayload> {
    vec![
        project(1, "E-commerce Platform", "A fully functional e-commerce platform built with Laravel and React. Features include product management, cart system, user authentication, and payment integration.", &["Laravel", "React", "Tailwind CSS", "MySQL"], true),
        project(2, "Task Management App", "A modern task management application with drag-and-drop functionality, team collaboration features, and real-time updates.", &["React", "Node.js", "MongoDB", "Socket.io"], true),
        project(3, "Personal Finance Dashboard", "An intuitive dashboard for tracking personal finances, including expense categorization, budget planning, and visualization tools.", &["Vue.js", "Firebase", "Chart.js"], false),
        project(4, "Social Media Analytics Tool", "A comprehensive analytics tool that helps businesses track and analyze their social media performance across multiple platforms.", &["React", "Python", "Django", "D3.js"], false),
        project(5, "Real Estate Listing Platform", "A feature-rich platform for real estate listings with advanced search capabilities, virtual tours, and agent management.", &["Laravel", "Alpine.js", "Tailwind CSS", "PostgreSQL"], true),
        project(6, "Portfolio Website", "A responsive portfolio website built with Laravel and React, showcasing your skills and projects.", &["Laravel", "React", "Tailwind CSS"], true),
    ]
}

fn social_links() -> Vec<SocialLinkPayload> {
    [
        ("GitHub", "https://github.com/yourusername", "github"),
        ("LinkedIn", "https://linkedin.com/in/yourusername", "linkedin"),
        ("Twitter", "https://twitter.com/yourusername", "twitter"),
        ("Instagram", "https://instagram.com/yourusername", "instagram"),
    ]
    .into_iter()
    .map(|(name, url, icon)| SocialLinkPayload {
        name: name.to_string(),
        url: url.to_string(),
        icon: icon.to_string(),
    })
    .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let owner_id = parse_owner(&args)?;
    let config = Config::from_env()?;

    let store: Arc<dyn ItemStore> = match config.storage_backend {
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
            let store = PostgresItemStore::connect(url, config.db_max_connections).await?;
            store.ensure_schema().await?;
            Arc::new(store)
        }
        StorageBackend::Memory => {
            println!("> Warning: STORAGE_BACKEND=memory, seeded data will not persist.");
            Arc::new(MemoryItemStore::new())
        }
    };

    println!("> Seeding portfolio for owner {}...", owner_id);

    let portfolio = PortfolioService::new(store.clone());
    portfolio.save_personal_info(owner_id, personal_info()).await?;
    println!("  Personal info saved.");

    let project_manager = OrderedCollectionManager::<ProjectPayload>::new(store.clone());
    let existing = project_manager.list(owner_id).await?;
    let mut order = Vec::new();
    for payload in projects() {
        let title = payload.title.clone();
        let item = match existing.iter().find(|p| p.payload.title == title) {
            Some(found) => project_manager.replace_payload(owner_id, found.id, payload, None).await?,
            None => project_manager.append(owner_id, payload).await?,
        };
        println!("  Project #{} {}", item.id, title);
        order.push(item.id);
    }
    keep_seeded_order(&project_manager, owner_id, order).await?;

    let link_manager = OrderedCollectionManager::<SocialLinkPayload>::new(store);
    let existing = link_manager.list(owner_id).await?;
    let mut order = Vec::new();
    for payload in social_links() {
        let name = payload.name.clone();
        let item = match existing.iter().find(|l| l.payload.name == name) {
            Some(found) => link_manager.replace_payload(owner_id, found.id, payload, None).await?,
            None => link_manager.append(owner_id, payload).await?,
        };
        println!("  Social link #{} {}", item.id, name);
        order.push(item.id);
    }
    keep_seeded_order(&link_manager, owner_id, order).await?;

    println!("> Seed complete.");
    Ok(())
}

/// Puts the seeded items first, in seed order, followed by anything else the owner already had.
async fn keep_seeded_order<P: portfolio_cms::ItemPayload>(
    manager: &OrderedCollectionManager<P>,
    owner_id: OwnerId,
    mut order: Vec<i64>,
) -> anyhow::Result<()> {
    for item in manager.list(owner_id).await? {
        if !order.contains(&item.id) {
            order.push(item.id);
        }
    }
    manager.reorder(owner_id, &order).await?;
    Ok(())
}
