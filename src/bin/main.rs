use anyhow::Error;
use sehat::{endpoints, ApiClient, AuthStore, Fact, HealthProfile, SessionTag};
use structopt::StructOpt;
use url::Url;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::from_args();

    log::debug!("Starting with {:#?}", args);

    let store = AuthStore::in_memory();
    let api = ApiClient::new(args.host.clone(), store)?;

    let user = endpoints::login(&api, &args.email, &args.password).await?;
    log::info!("Signed in as {}", user.full_name);

    let profile = HealthProfile {
        age: args.age,
        pregnancy: args.pregnancy,
        diabetes: args.diabetes,
        hypertension: args.hypertension,
        city: args.city.clone(),
    };

    let reply =
        endpoints::chat(&api, &args.message, &args.lang, &profile).await?;

    println!("{}", reply.answer);

    if reply.safety.red_flag {
        println!();
        println!("!! These symptoms may need urgent care: {}", reply.safety.matched.join(", "));
    }

    for fact in &reply.facts {
        match fact {
            Fact::MentalHealthCrisis(crisis) => {
                println!();
                println!("You are not alone. Please consider these steps:");
                for action in &crisis.actions {
                    println!("  - {}", action);
                }
            },
            Fact::PregnancyAlert(alert) => {
                println!();
                for line in &alert.guidance {
                    println!("  - {}", line);
                }
            },
            Fact::Contraindications(entries) => {
                println!();
                for entry in entries {
                    println!(
                        "Avoid ({}): {}",
                        entry.condition,
                        entry.avoid.join(", ")
                    );
                }
            },
            _ => {},
        }
    }

    if !reply.citations.is_empty() {
        println!();
        println!("Sources:");
        for citation in &reply.citations {
            println!("  - {} ({})", citation.source, citation.id);
        }
    }

    if let Some(customer_id) = &args.customer_id {
        let sessions =
            endpoints::customer_sessions(&api, customer_id, args.limit)
                .await?;

        println!();
        println!("Recent conversations:");
        for session in &sessions {
            let tag = SessionTag::derive(&session.id);
            println!(
                "  {} [{}] {} message(s) - {}",
                tag,
                session.language,
                session.message_count,
                session.first_message.as_deref().unwrap_or("(empty)"),
            );
        }
    }

    log::info!("Logging out");
    endpoints::logout(&api).await?;

    Ok(())
}

#[derive(Debug, StructOpt)]
struct Args {
    #[structopt(
        long = "host",
        default_value = "http://localhost:8000/",
        help = "The Sehat server's base URL"
    )]
    host: Url,
    #[structopt(short = "e", long = "email", help = "Your account email")]
    email: String,
    #[structopt(short = "p", long = "password", help = "Your password")]
    password: String,
    #[structopt(help = "The symptom description to send")]
    message: String,
    #[structopt(
        short = "l",
        long = "lang",
        default_value = "en",
        help = "Answer language, e.g. en or hi"
    )]
    lang: String,
    #[structopt(long = "age", help = "Your age in years")]
    age: Option<u32>,
    #[structopt(long = "pregnancy", help = "Tailor answers for pregnancy")]
    pregnancy: bool,
    #[structopt(long = "diabetes", help = "Tailor answers for diabetes")]
    diabetes: bool,
    #[structopt(
        long = "hypertension",
        help = "Tailor answers for hypertension"
    )]
    hypertension: bool,
    #[structopt(long = "city", help = "Used for provider suggestions")]
    city: Option<String>,
    #[structopt(
        long = "customer-id",
        help = "List this customer's recent sessions after the chat"
    )]
    customer_id: Option<String>,
    #[structopt(
        long = "limit",
        default_value = "10",
        help = "How many sessions to list"
    )]
    limit: usize,
}
