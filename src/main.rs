use anyhow::Context;
use clap::Parser;
use psy_catalog::app::render::{render_notice, render_page, render_session, render_slots};
use psy_catalog::config::Command;
use psy_catalog::domain::forms::{AppointmentRequest, LoginForm, RegisterForm};
use psy_catalog::utils::{logger, validation::Validate};
use psy_catalog::{CatalogApp, CatalogError, CliConfig, TomlConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入設定檔並套用命令列覆蓋
    let mut config = match &cli.config {
        Some(path) => TomlConfig::from_file(path)
            .with_context(|| format!("Failed to load config file '{}'", path))?,
        None => TomlConfig::default(),
    };
    cli.apply_overrides(&mut config);

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger(cli.verbose, config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose, config.log_level());
    }

    tracing::debug!("CLI config: {:?}", cli);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    if let Err(e) = run(cli.command, config).await {
        tracing::error!("❌ Command failed: {} (kind: {:?})", e, e.kind());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    Ok(())
}

async fn run(command: Command, config: TomlConfig) -> Result<(), CatalogError> {
    if let Command::Slots = command {
        println!("{}", render_slots());
        return Ok(());
    }

    let mut app = CatalogApp::open(config).await?;

    match command {
        Command::List { sort, more, format } => {
            let outcome = app.list(sort, more).await?;
            if let Some(notice) = &outcome.notice {
                eprintln!("{}", render_notice(notice));
            }
            print!("{}", render_page(&outcome.page, format, app.favorite_set())?);
        }
        Command::Favorites { sort, format } => {
            let outcome = app.favorites(sort).await?;
            if let Some(notice) = &outcome.notice {
                eprintln!("{}", render_notice(notice));
            }
            if !outcome.page.items.is_empty() {
                print!("{}", render_page(&outcome.page, format, app.favorite_set())?);
            }
        }
        Command::Favorite { identity } => {
            let notice = app.toggle_favorite(&identity).await?;
            println!("{}", render_notice(&notice));
        }
        Command::Login { email, password } => {
            let notice = app.login(LoginForm::new(&email, password.expose())).await?;
            println!("{}", render_notice(&notice));
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            let notice = app
                .register(RegisterForm::new(&name, &email, password.expose()))
                .await?;
            println!("{}", render_notice(&notice));
        }
        Command::Logout => {
            let notice = app.logout().await?;
            println!("{}", render_notice(&notice));
        }
        Command::Whoami => {
            println!("{}", render_session(app.session().as_ref()));
        }
        Command::Book {
            identity,
            name,
            email,
            phone,
            time,
            comment,
        } => {
            let notice = app
                .book(AppointmentRequest {
                    psychologist: identity,
                    name,
                    email,
                    phone,
                    time,
                    comment,
                })
                .await?;
            println!("{}", render_notice(&notice));
        }
        Command::Slots => {}
    }

    Ok(())
}
