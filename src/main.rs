use clap::Parser;
use std::io::Write;
use std::ops::ControlFlow;
use std::sync::Arc;
use tender_desk::core::access::{require_access, PinVerifier};
use tender_desk::core::contact::{ContactService, ContactSettings};
use tender_desk::core::dashboard::{self, Tab, ViewState};
use tender_desk::core::documents::Document;
use tender_desk::core::export;
use tender_desk::core::requirements::{RequirementsForm, RequirementsService};
use tender_desk::core::tenders::{TenderForm, TenderService};
use tender_desk::core::ticker::Ticker;
use tender_desk::domain::ports::Clock;
use tender_desk::utils::error::ErrorSeverity;
use tender_desk::utils::{logger, validation::Validate};
use tender_desk::{CliConfig, Command, HttpNotifier, PortalConfig, PortalError, RestStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // Logging
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("📁 Loading configuration from: {}", cli.config);
    let config = match PortalConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // Validate before touching the network
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(cli, config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(cli: CliConfig, config: PortalConfig) -> Result<(), PortalError> {
    let store = RestStore::new(
        &config.store.url,
        &config.store.api_key,
        config.request_timeout(),
    )?;
    let clock: Arc<dyn Clock> = cli.clock()?;

    let verifier = PinVerifier::new(store.clone());
    require_access(&verifier, cli.access_pin()?).await?;

    let offset = config.display_offset()?;
    let bucket = config.storage.bucket.clone();
    let tenders = TenderService::new(store.clone(), store.clone(), clock.clone(), bucket.clone());
    let requirements = RequirementsService::new(store.clone(), store.clone(), clock.clone(), bucket)
        .with_max_upload_bytes(config.max_upload_bytes());

    match cli.command {
        Command::Login => {
            println!("✅ Access granted");
        }
        Command::Tenders => {
            let list = tenders.list_tenders().await?;
            print!("{}", dashboard::render_tenders(&list, clock.now(), &offset));
        }
        Command::Submitted => {
            let list = tenders.list_submitted().await?;
            print!("{}", dashboard::render_submitted(&list, clock.now(), &offset));
        }
        Command::Requests => {
            let list = requirements.list_requests().await?;
            print!("{}", dashboard::render_requests(&list, clock.now(), &offset));
        }
        Command::Show { id } => {
            let tender = tenders.find_tender(id).await?;
            print!("{}", dashboard::render_detail(&tender, &offset));
        }
        Command::Watch { tab } => {
            let mut state = ViewState {
                tab,
                ..ViewState::default()
            };
            match tab {
                Tab::Tenders => state.tenders = tenders.list_tenders().await?,
                Tab::Submitted => state.submitted = tenders.list_submitted().await?,
                Tab::Requests => state.requests = requirements.list_requests().await?,
            }

            let ticker = Ticker::new(clock.clone(), config.refresh_interval(tab));
            tracing::info!("⏱️ Refreshing every {:?}, Ctrl-C to stop", ticker.interval());
            ticker
                .run(
                    async {
                        let _ = tokio::signal::ctrl_c().await;
                    },
                    |now| {
                        let mut stdout = std::io::stdout().lock();
                        let frame = dashboard::render(&state, now, &offset);
                        match write!(stdout, "\x1B[2J\x1B[H{}", frame).and_then(|_| stdout.flush()) {
                            Ok(()) => ControlFlow::Continue(()),
                            Err(_) => ControlFlow::Break(()),
                        }
                    },
                )
                .await;
        }
        Command::Create {
            name,
            deadline,
            amount,
            description,
            requirements: tender_requirements,
        } => {
            let tender = tenders
                .create_tender(TenderForm {
                    name,
                    description,
                    requirements: tender_requirements,
                    deadline,
                    quoted_amount: amount,
                })
                .await?;
            println!("✅ Created tender {} '{}'", tender.id, tender.name);
        }
        Command::Complete { id, document } => {
            let tender = tenders.find_tender(id).await?;
            let document = Document::from_path(&document).await?;
            let submitted = tenders.complete_tender(&tender, document).await?;
            println!(
                "✅ '{}' marked as submitted, document at {}",
                submitted.name, submitted.document_url
            );
        }
        Command::Delete { id } => {
            tenders.delete_tender(id).await?;
            println!("🗑️ Deleted tender {}", id);
        }
        Command::SubmitRequirements {
            name,
            deadline,
            description,
            files,
        } => {
            let mut documents = Vec::with_capacity(files.len());
            for path in &files {
                documents.push(Document::from_path(path).await?);
            }
            let submission = requirements
                .submit(RequirementsForm {
                    tender_name: name,
                    deadline,
                    description,
                    files: documents,
                })
                .await?;
            println!(
                "✅ Requirements for '{}' submitted with {} file(s)",
                submission.tender_name,
                submission.files.len()
            );
        }
        Command::Contact { subject, message } => {
            let contact = config.contact()?;
            let notifier = HttpNotifier::new(
                &contact.endpoint,
                contact.api_key.clone(),
                config.request_timeout(),
            )?;
            let service = ContactService::new(
                notifier,
                ContactSettings {
                    sender_name: contact.sender_name.clone(),
                    sender_email: contact.sender_email.clone(),
                    recipient: contact.recipient.clone(),
                },
            );
            service.send(&subject, &message).await?;
            println!("✅ Message sent. We'll get back to you soon.");
        }
        Command::Export { output } => {
            let list = tenders.list_tenders().await?;
            let count = export::export_tenders(&output, &list, clock.now())?;
            println!("📁 Exported {} tenders to {}", count, output.display());
        }
    }

    Ok(())
}
