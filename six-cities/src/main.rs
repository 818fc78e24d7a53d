//! six-cities - Browse rental offers, manage favorites and post reviews
//!
//! Command-line front-end over the libsixcities store. Every command runs
//! the same dispatchers a graphical client would and prints selector output.

use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use libsixcities::logging::{LogFormat, LoggingConfig};
use libsixcities::store::selectors::OffersByCity;
use libsixcities::types::CITIES;
use libsixcities::{
    ApiError, CommentData, Config, FileTokenStorage, HttpApiClient, LoginData, Offer, Review,
    SixCitiesError, SortOption, Store, TokenStorage,
};
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "six-cities")]
#[command(version)]
#[command(about = "Browse rental offers, manage favorites and post reviews")]
#[command(long_about = "\
six-cities - Browse rental offers, manage favorites and post reviews

DESCRIPTION:
    six-cities talks to the Six Cities booking service. Browse offers by city,
    inspect a single offer with its reviews and neighbours, sign in, keep a
    list of favorites and post reviews.

COMMANDS:
    offers      List offers, optionally filtered by city and sorted
    offer       Show one offer with its newest reviews and nearby offers
    login       Sign in and store the session token
    logout      Forget the stored session token
    whoami      Show the signed-in user
    favorites   List favorite offers grouped by city
    favorite    Add or remove an offer from favorites
    review      Post a review for an offer

USAGE EXAMPLES:
    # Cheapest offers in Amsterdam
    six-cities offers --city Amsterdam --sort price-asc

    # One offer as JSON
    six-cities offer 6af6f711-c28d-4121-82cd-e0b462a27f00 --format json

    # Sign in (password read from stdin when --password is omitted)
    echo 'secret1' | six-cities login oliver.conner@gmail.com

    # Mark an offer as favorite
    six-cities favorite 6af6f711-c28d-4121-82cd-e0b462a27f00 --on

CONFIGURATION:
    Configuration file: ~/.config/six-cities/config.toml
    Session token:      ~/.local/share/six-cities/six-cities-token

    Override with environment variables:
        SIX_CITIES_CONFIG      - Path to config file
        SIX_CITIES_LOG_FORMAT  - Log format (text, json, pretty)
        SIX_CITIES_LOG_LEVEL   - Log level (error, warn, info, debug, trace)

EXIT CODES:
    0 - Success
    1 - Request or configuration failed
    2 - Not signed in, or the session was rejected
    3 - Invalid input (bad rating, comment length, format, city, etc.)
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format: text, json or pretty
    #[arg(long, global = true, env = "SIX_CITIES_LOG_FORMAT", default_value = "text")]
    log_format: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List offers
    Offers {
        /// Only show offers in this city
        #[arg(short, long)]
        city: Option<String>,

        /// Sort order: popular, price-asc, price-desc or top-rated
        #[arg(short, long, default_value = "popular")]
        sort: String,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show one offer with reviews and nearby offers
    Offer {
        /// Offer ID
        id: String,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Sign in
    Login {
        /// Account email
        email: String,

        /// Password (read from stdin if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored session token
    Logout,

    /// Show the signed-in user
    Whoami {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List favorite offers
    Favorites {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Add an offer to favorites or remove it
    #[command(group(ArgGroup::new("status").required(true).args(["on", "off"])))]
    Favorite {
        /// Offer ID
        id: String,

        /// Add to favorites
        #[arg(long)]
        on: bool,

        /// Remove from favorites
        #[arg(long)]
        off: bool,
    },

    /// Post a review
    Review {
        /// Offer ID
        id: String,

        /// Rating from 1 to 5
        #[arg(short, long)]
        rating: u8,

        /// Review text, 50 to 300 characters
        #[arg(short, long)]
        comment: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn parse(format: &str) -> libsixcities::Result<Self> {
        match format {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(SixCitiesError::InvalidInput(format!(
                "Invalid format '{}'. Must be 'text' or 'json'",
                format
            ))),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_format = match cli.log_format.parse::<LogFormat>() {
        Ok(format) => format,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(3);
        }
    };
    let level = std::env::var("SIX_CITIES_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());
    LoggingConfig::new(log_format, level, cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

/// Library errors keep their exit code through any added context
fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<SixCitiesError>()
        .map(SixCitiesError::exit_code)
        .unwrap_or(1)
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let storage: Arc<dyn TokenStorage> = Arc::new(FileTokenStorage::new(config.token_path()?));
    let api = HttpApiClient::new(&config.api, storage.clone()).map_err(SixCitiesError::from)?;
    tracing::debug!("Using API at {}", api.base_url());

    // Ctrl-C aborts whatever request is in flight
    let interrupt = CancellationToken::new();
    let on_signal = interrupt.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });
    let store = Store::new(Arc::new(api), storage).with_cancellation(interrupt);

    match cli.command {
        Commands::Offers { city, sort, format } => {
            cmd_offers(&store, city.as_deref(), &sort, &format).await
        }
        Commands::Offer { id, format } => cmd_offer(&store, &id, &format).await,
        Commands::Login { email, password } => cmd_login(&store, &email, password).await,
        Commands::Logout => {
            store.logout();
            println!("Logged out");
            Ok(())
        }
        Commands::Whoami { format } => cmd_whoami(&store, &format).await,
        Commands::Favorites { format } => cmd_favorites(&store, &format).await,
        Commands::Favorite { id, on, .. } => cmd_favorite(&store, &id, on).await,
        Commands::Review { id, rating, comment } => cmd_review(&store, &id, rating, &comment).await,
    }
}

/// Fail fast with "not signed in" instead of sending a request bound to get 401
fn require_session(store: &Store) -> libsixcities::Result<()> {
    if store.storage().load()?.is_some() {
        return Ok(());
    }
    Err(SixCitiesError::Api(ApiError::Server {
        status: 401,
        message: "Not signed in. Run `six-cities login <email>` first.".to_string(),
    }))
}

/// Match a city name case-insensitively against the supported cities
fn resolve_city(city: &str) -> libsixcities::Result<&'static str> {
    CITIES
        .iter()
        .copied()
        .find(|known| known.eq_ignore_ascii_case(city.trim()))
        .ok_or_else(|| {
            SixCitiesError::InvalidInput(format!(
                "Unknown city '{}'. Valid cities: {}",
                city,
                CITIES.join(", ")
            ))
        })
}

async fn cmd_offers(store: &Store, city: Option<&str>, sort: &str, format: &str) -> Result<()> {
    let format = OutputFormat::parse(format)?;
    let sort: SortOption = sort.parse().map_err(SixCitiesError::InvalidInput)?;
    if let Some(city) = city {
        store.set_city(resolve_city(city)?);
    }

    store
        .fetch_offers()
        .await
        .into_result()
        .context("Failed to load offers")?;

    let state = store.state();
    let offers = store.selectors().sorted_city_offers(&state, sort);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(offers.as_slice())?),
        OutputFormat::Text => {
            for offer in offers.iter() {
                println!("{}", offer_line(offer));
            }
        }
    }
    Ok(())
}

async fn cmd_offer(store: &Store, id: &str, format: &str) -> Result<()> {
    let format = OutputFormat::parse(format)?;

    let (offer, _, _) = tokio::join!(
        store.fetch_offer(id),
        store.fetch_nearby_offers(id),
        store.fetch_reviews(id),
    );
    let offer = offer
        .into_result()
        .with_context(|| format!("Failed to load offer {}", id))?;

    let state = store.state();
    let reviews = store.selectors().sorted_reviews(&state);
    let nearby = store.selectors().nearby_for_display(&state);

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "offer": offer,
                "reviews": reviews.as_slice(),
                "nearby": nearby.as_slice(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => print_offer_page(&offer, &reviews, &nearby),
    }
    Ok(())
}

async fn cmd_login(store: &Store, email: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => read_password_from_stdin()?,
    };

    let credentials = LoginData::new(email, password);
    if credentials.email.is_empty() || credentials.password.is_empty() {
        return Err(SixCitiesError::InvalidInput("Email and password are required".to_string()).into());
    }

    let user = store.login(&credentials).await.into_result()?;
    println!("Logged in as {}", user.email);
    Ok(())
}

fn read_password_from_stdin() -> Result<String> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    Ok(line.trim().to_string())
}

async fn cmd_whoami(store: &Store, format: &str) -> Result<()> {
    let format = OutputFormat::parse(format)?;
    require_session(store)?;

    let user = store.check_auth().await.into_result()?;
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "email": user.email,
                "name": user.name,
                "avatarUrl": user.avatar_url,
                "isPro": user.is_pro,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            let pro = if user.is_pro { " (pro)" } else { "" };
            println!("{} <{}>{}", user.name, user.email, pro);
        }
    }
    Ok(())
}

async fn cmd_favorites(store: &Store, format: &str) -> Result<()> {
    let format = OutputFormat::parse(format)?;
    require_session(store)?;

    store
        .fetch_favorites()
        .await
        .into_result()
        .context("Failed to load favorites")?;

    let state = store.state();
    let groups = store.selectors().favorites_by_city(&state);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&grouped_json(&groups))?),
        OutputFormat::Text => {
            if groups.is_empty() {
                println!("Nothing yet saved");
            }
            for (city, offers) in groups.iter() {
                println!("{}", city);
                for offer in offers {
                    println!("  {}", offer_line(offer));
                }
            }
        }
    }
    Ok(())
}

async fn cmd_favorite(store: &Store, id: &str, is_favorite: bool) -> Result<()> {
    require_session(store)?;

    let offer = store.toggle_favorite(id, is_favorite).await.into_result()?;
    if offer.is_favorite {
        println!("Added {} to favorites", offer.id);
    } else {
        println!("Removed {} from favorites", offer.id);
    }
    Ok(())
}

async fn cmd_review(store: &Store, id: &str, rating: u8, comment: &str) -> Result<()> {
    let review = CommentData::new(rating, comment);
    review.validate()?;
    require_session(store)?;

    let posted = store.submit_review(id, &review).await.into_result()?;
    println!("Posted review {} for offer {}", posted.id, id);
    Ok(())
}

fn offer_line(offer: &Offer) -> String {
    let premium = if offer.is_premium { " | premium" } else { "" };
    let favorite = if offer.is_favorite { " | ♥" } else { "" };
    format!(
        "{} | {} | {} | €{} | {:.1}{}{}",
        offer.id, offer.title, offer.kind, offer.price, offer.rating, premium, favorite
    )
}

fn grouped_json(groups: &OffersByCity) -> serde_json::Value {
    let groups: Vec<_> = groups
        .iter()
        .map(|(city, offers)| serde_json::json!({ "city": city, "offers": offers }))
        .collect();
    serde_json::Value::Array(groups)
}

fn print_offer_page(offer: &Offer, reviews: &[Review], nearby: &[Offer]) {
    println!("{}", offer.title);
    println!("{} in {} | €{} a night | rating {:.1}", offer.kind, offer.city.name, offer.price, offer.rating);
    if let (Some(bedrooms), Some(adults)) = (offer.bedrooms, offer.max_adults) {
        println!("{} bedrooms, up to {} adults", bedrooms, adults);
    }
    if !offer.goods.is_empty() {
        println!("Amenities: {}", offer.goods.join(", "));
    }
    if let Some(host) = &offer.host {
        let pro = if host.is_pro { " (pro)" } else { "" };
        println!("Host: {}{}", host.name, pro);
    }
    if let Some(description) = &offer.description {
        println!();
        println!("{}", description);
    }

    println!();
    println!("Reviews ({})", reviews.len());
    for review in reviews {
        println!("  [{}/5] {} on {}", review.rating, review.user.name, review.date);
        println!("    {}", review.comment);
    }

    if !nearby.is_empty() {
        println!();
        println!("Other places in the neighbourhood");
        for offer in nearby {
            println!("  {}", offer_line(offer));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("json").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("xml").unwrap_err().exit_code(), 3);
    }

    #[test]
    fn test_resolve_city_case_insensitive() {
        assert_eq!(resolve_city("amsterdam").unwrap(), "Amsterdam");
        assert_eq!(resolve_city(" DUSSELDORF ").unwrap(), "Dusseldorf");
        assert!(resolve_city("Atlantis").is_err());
    }

    #[test]
    fn test_exit_code_survives_context() {
        let error = anyhow::Error::from(SixCitiesError::Api(ApiError::Status(401)))
            .context("Failed to load favorites");
        assert_eq!(exit_code(&error), 2);

        let error = anyhow::anyhow!("plain failure");
        assert_eq!(exit_code(&error), 1);
    }

    #[test]
    fn test_cli_parses_favorite_flags() {
        let cli = Cli::try_parse_from(["six-cities", "favorite", "42", "--off"]).unwrap();
        match cli.command {
            Commands::Favorite { id, on, off } => {
                assert_eq!(id, "42");
                assert!(!on);
                assert!(off);
            }
            other => panic!("unexpected command {:?}", other),
        }

        assert!(Cli::try_parse_from(["six-cities", "favorite", "42"]).is_err());
        assert!(Cli::try_parse_from(["six-cities", "favorite", "42", "--on", "--off"]).is_err());
    }
}
