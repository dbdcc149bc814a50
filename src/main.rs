use clap::Parser;
use moraqqat_subscribe::app::navigation;
use moraqqat_subscribe::config::cli::Command;
use moraqqat_subscribe::core::{
    AddOnId, CatalogProvider, ConfigProvider, EntitlementProvider, PetId, PlanId, Session, UserId,
};
use moraqqat_subscribe::utils::money::{format_minor_units, format_monthly};
use moraqqat_subscribe::utils::{logger, validation::Validate};
use moraqqat_subscribe::{
    CachedCatalog, Checkout, CheckoutChoices, CliArgs, HttpStorefrontClient, SelectionSummary,
    StorefrontConfig, StorefrontError, SubmissionError, WorkflowError,
};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting moraqqat-subscribe");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    if let Err(e) = run(args.command, &config).await {
        tracing::error!("❌ {}", e);
        exit_with(&e);
    }
}

fn exit_with(e: &StorefrontError) -> ! {
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e {
        StorefrontError::Workflow(WorkflowError::Submission(SubmissionError::Transient { .. }))
        | StorefrontError::Http(_)
        | StorefrontError::DataUnavailable { .. } => 2,
        StorefrontError::Workflow(WorkflowError::Submission(SubmissionError::Rejected { .. })) => 3,
        _ => 1,
    };
    std::process::exit(exit_code);
}

async fn run(command: Command, config: &StorefrontConfig) -> Result<(), StorefrontError> {
    let client = Arc::new(HttpStorefrontClient::new(config));
    tracing::debug!("Using storefront API at {}", client.base_url());

    match command {
        Command::Catalog => print_catalog(client.as_ref(), config.currency()).await,
        Command::Pets { user } => {
            let pets = client.list_pets(UserId(user)).await?;
            if pets.is_empty() {
                println!("No pets yet. Create a pet profile first.");
            }
            for pet in pets {
                let breed = pet.breed.as_deref().unwrap_or("unknown breed");
                println!("[{}] {} ({})", pet.id, pet.name, breed);
            }
            Ok(())
        }
        Command::Subscriptions { user } => {
            let subscriptions = client.list_subscriptions(UserId(user)).await?;
            if subscriptions.is_empty() {
                println!("No subscriptions yet.");
            }
            for subscription in subscriptions {
                println!(
                    "[{}] pet {} plan {} {:?} {}",
                    subscription.id,
                    subscription.pet_id,
                    subscription.plan_id,
                    subscription.status,
                    format_minor_units(subscription.total_price, config.currency())
                );
            }
            Ok(())
        }
        Command::Subscribe {
            user,
            pet,
            plan,
            add_ons,
            dry_run,
        } => {
            let choices = CheckoutChoices {
                pet_id: PetId(pet),
                plan_id: PlanId(plan),
                add_on_ids: add_ons.into_iter().map(AddOnId).collect(),
            };
            subscribe(client, config, Session::new(UserId(user)), &choices, dry_run).await
        }
    }
}

async fn print_catalog<C: CatalogProvider>(catalog: &C, currency: &str) -> Result<(), StorefrontError> {
    println!("Plans:");
    for plan in catalog.list_plans().await? {
        println!("  [{}] {}: {}", plan.id, plan.name, format_monthly(plan.monthly_price, currency));
        for feature in &plan.features {
            println!("      - {}", feature);
        }
    }
    println!("Add-ons:");
    for add_on in catalog.list_add_ons().await? {
        println!("  [{}] {}: {}", add_on.id, add_on.name, format_monthly(add_on.price, currency));
    }
    Ok(())
}

async fn subscribe(
    client: Arc<HttpStorefrontClient>,
    config: &StorefrontConfig,
    session: Session,
    choices: &CheckoutChoices,
    dry_run: bool,
) -> Result<(), StorefrontError> {
    let checkout = Checkout::new(
        CachedCatalog::new(Arc::clone(&client)),
        Arc::clone(&client),
        client,
    )
    .with_submission_timeout(config.submission_timeout());

    let destination = checkout.entry(&session).await?;
    if destination == navigation::Destination::PetProfile {
        eprintln!("🐾 No pet profile yet; create one at {}", destination.path());
        return Err(StorefrontError::UnknownSelection {
            kind: "pet",
            id: choices.pet_id.to_string(),
        });
    }

    let mut workflow = checkout.configure(session, choices).await?;
    println!("{}", SelectionSummary::from_selection(workflow.selection()).render(config.currency()));

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - subscription not submitted");
        return Ok(());
    }

    let id = workflow.submit_and_wait().await?;
    println!("✅ Subscription {} created", id);
    if let Some(next) = navigation::after_step(workflow.step()) {
        println!("📁 Continue at {}", next.path());
    }
    Ok(())
}
