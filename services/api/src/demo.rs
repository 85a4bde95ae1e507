use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::Args;

use homeshare::accounts::{SessionService, UserId};
use homeshare::billing::{BillingService, PackageCatalog, PackageId, PaymentMethod};
use homeshare::error::AppError;
use homeshare::listings::{
    filter_listings, sort_listings, ContactChannels, FilterSpec, Listing, ListingCategory,
    ListingCsvImporter, ListingDraft, ListingId, ListingService, SortKey,
};

use crate::infra::{
    demo_listings, seed_demo_data, InMemoryListingRepository, InMemoryOrderStore,
    InMemoryUserDirectory,
};

#[derive(Args, Debug, Default)]
pub(crate) struct FeedQueryArgs {
    /// Restrict to one feed: roommate or apartment
    #[arg(long)]
    pub(crate) category: Option<String>,
    /// Free-text query matched against title and description
    #[arg(long)]
    pub(crate) query: Option<String>,
    /// Location substring
    #[arg(long)]
    pub(crate) location: Option<String>,
    /// Minimum price in VND; non-numeric input means no bound
    #[arg(long)]
    pub(crate) min_price: Option<String>,
    /// Maximum price in VND; non-numeric input means no bound
    #[arg(long)]
    pub(crate) max_price: Option<String>,
    /// Sort key: newest, price-asc, or price-desc
    #[arg(long)]
    pub(crate) sort: Option<String>,
    /// Optional listing CSV export to query instead of the demo seed
    #[arg(long)]
    pub(crate) listings_csv: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Optional listing CSV export to hydrate the feed before the demo runs
    #[arg(long)]
    pub(crate) listings_csv: Option<PathBuf>,
    /// Skip the package purchase portion of the demo
    #[arg(long)]
    pub(crate) skip_billing: bool,
}

pub(crate) fn run_feed_query(args: FeedQueryArgs) -> Result<(), AppError> {
    let FeedQueryArgs {
        category,
        query,
        location,
        min_price,
        max_price,
        sort,
        listings_csv,
    } = args;

    let (mut listings, source) = match listings_csv {
        Some(path) => {
            let drafts = ListingCsvImporter::from_path(&path)?;
            let label = format!("CSV export {}", path.display());
            (materialize_imported(drafts), label)
        }
        None => (demo_listings(), "demo seed".to_string()),
    };

    println!("Listing feed query");
    println!("Source: {source}");

    let category = category.as_deref().and_then(ListingCategory::from_param);
    if let Some(category) = category {
        listings.retain(|listing| listing.category == category);
    }

    let spec = FilterSpec::from_params(
        query.as_deref(),
        location.as_deref(),
        min_price.as_deref(),
        max_price.as_deref(),
    );
    let mut result = filter_listings(listings, &spec);

    match sort.as_deref() {
        None => result = sort_listings(result, SortKey::Newest),
        Some(raw) => match SortKey::from_param(raw) {
            Some(key) => result = sort_listings(result, key),
            None => println!("Unrecognized sort key '{raw}', keeping original order"),
        },
    }

    println!("{} listings match", result.len());
    for listing in &result {
        render_listing(listing);
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        listings_csv,
        skip_billing,
    } = args;

    let directory = Arc::new(InMemoryUserDirectory::default());
    let listing_store = Arc::new(InMemoryListingRepository::default());
    let order_store = Arc::new(InMemoryOrderStore::default());
    seed_demo_data(&directory, &listing_store, &order_store);

    if let Some(path) = listings_csv {
        let drafts = ListingCsvImporter::from_path(&path)?;
        let imported = materialize_imported(drafts);
        println!("Hydrated {} listings from {}", imported.len(), path.display());
        listing_store.preload(imported);
    }

    let sessions = SessionService::new(directory.clone(), 120);
    let listings = ListingService::new(listing_store.clone(), directory.clone());
    let billing = BillingService::new(
        order_store.clone(),
        directory.clone(),
        PackageCatalog::standard(),
    );

    println!("HomeShare marketplace demo");

    let grant = sessions.login("an@student.edu.vn", "demo-password")?;
    println!(
        "\nLogged in as {} ({}) with {} post credits",
        grant.user.name,
        grant.user.role.label(),
        grant.user.remaining_credits
    );

    for category in ListingCategory::ordered() {
        let feed = listings.feed(Some(category), &FilterSpec::none(), Some(SortKey::Newest))?;
        println!("\n{} feed ({} listings)", category.label(), feed.len());
        for listing in &feed {
            render_listing(listing);
        }
    }

    let published = listings.submit(
        &grant.user.id,
        ListingDraft {
            category: ListingCategory::Roommate,
            title: "Tìm bạn ở ghép khu Thủ Đức".to_string(),
            description: "Phòng mới, gần làng đại học, giờ giấc tự do.".to_string(),
            price: 1_800_000,
            location: "Thủ Đức, TP.HCM".to_string(),
            images: Vec::new(),
            amenities: vec!["WiFi".to_string(), "Chỗ để xe".to_string()],
            contact: ContactChannels {
                phone: Some("0901234567".to_string()),
                zalo: None,
                email: None,
            },
        },
    )?;
    let remaining = sessions.current_user(&grant.token)?.remaining_credits;
    println!(
        "\nPublished {} ({}); {} credits left",
        published.id,
        published.title,
        remaining
    );

    if skip_billing {
        println!("\nSkipping the billing walkthrough");
    } else {
        let order = billing.purchase(
            &grant.user.id,
            &PackageId("user_weekly".to_string()),
            PaymentMethod::Momo,
        )?;
        println!(
            "\nPurchased {} for {} via {} -> order {} ({})",
            order.package.name,
            format_vnd(order.package.price),
            order.payment_method.label(),
            order.id,
            order.status.label()
        );
        let topped_up = sessions.current_user(&grant.token)?.remaining_credits;
        println!("Credits after settlement: {topped_up}");

        println!("\nOrder history");
        for order in billing.history(&grant.user.id)? {
            let settled = match order.completed_at {
                Some(at) => format!(" (settled {})", at.format("%Y-%m-%d")),
                None => String::new(),
            };
            println!(
                "- {} | {} | {} | {}{}",
                order.id,
                order.package.name,
                format_vnd(order.package.price),
                order.status.label(),
                settled
            );
        }
    }

    Ok(())
}

fn materialize_imported(drafts: Vec<ListingDraft>) -> Vec<Listing> {
    let now = Utc::now();
    drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| Listing {
            id: ListingId(format!("import-{:04}", index + 1)),
            category: draft.category,
            title: draft.title,
            description: draft.description,
            price: draft.price,
            location: draft.location,
            images: draft.images,
            amenities: draft.amenities,
            author_id: UserId("user-binh".to_string()),
            created_at: now,
            active: true,
            contact: draft.contact,
        })
        .collect()
}

fn render_listing(listing: &Listing) {
    println!(
        "- [{}] {} | {} | {} (posted {})",
        listing.category.label(),
        listing.title,
        format_vnd(listing.price),
        listing.location,
        listing.created_at.format("%Y-%m-%d")
    );
}

fn format_vnd(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index != 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    format!("{grouped}đ")
}
