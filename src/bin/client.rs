use clap::{Args, Parser, Subcommand};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(name = "tabshare")]
#[command(about = "client cli used by diners to claim items and settle a shared bill", version, long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser, Debug)]
enum Commands {
    /// bill item claim ops
    #[command(arg_required_else_help = true)]
    Item(ItemArgs),
    /// presence ops
    #[command(arg_required_else_help = true)]
    Presence(PresenceArgs),
    /// split preview and payment validation
    #[command(arg_required_else_help = true)]
    Pay(PayArgs),
}

#[derive(Debug, Args)]
struct ItemArgs {
    #[arg(short = 'i', help = "Bill item id to operate", value_parser = clap::value_parser!(i64).range(1..))]
    id: i64,
    #[command(subcommand)]
    command: ItemCmds,
}

#[derive(Debug, Subcommand)]
enum ItemCmds {
    #[command(arg_required_else_help = true)]
    Claim {
        #[arg(long, help = "Your participant id.")]
        participant: i64,
        #[arg(long, help = "Units of this line you are paying for.")]
        quantity: i32,
        #[arg(long, help = "Item version you last saw.")]
        version: i64,
    },
    #[command(arg_required_else_help = true)]
    Release {
        #[arg(long, help = "Your participant id.")]
        participant: i64,
    },
}

#[derive(Debug, Args)]
struct PresenceArgs {
    #[arg(short = 'p', help = "Participant id", value_parser = clap::value_parser!(i64).range(1..))]
    participant: i64,
    #[command(subcommand)]
    command: PresenceCmds,
}

#[derive(Debug, Subcommand)]
enum PresenceCmds {
    Heartbeat,
    Leave,
}

#[derive(Debug, Args)]
struct PayArgs {
    #[arg(short = 's', help = "Session id", value_parser = clap::value_parser!(i64).range(1..))]
    session: i64,
    #[command(subcommand)]
    command: PayCmds,
}

#[derive(Debug, Subcommand)]
enum PayCmds {
    /// show the server's authoritative equal-split preview
    Preview,
    #[command(arg_required_else_help = true)]
    Validate {
        #[arg(long, help = "Your participant id.")]
        participant: i64,
        #[arg(long, help = "Amount in cents you intend to pay.")]
        amount: i64,
        #[arg(long, help = "Participant count your split was computed for.")]
        count: u32,
        #[arg(long, help = "Bill total in cents your split was computed from.")]
        total: i64,
    },
}

const HOST: &str = "http://localhost:8080";

#[derive(Debug, Deserialize)]
struct ClaimResponse {
    success: bool,
    new_version: i64,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Cli::parse();

    match args.command {
        Commands::Item(item) => {
            let id = item.id;
            match item.command {
                ItemCmds::Claim {
                    participant,
                    quantity,
                    version,
                } => {
                    let res = Client::new()
                        .post(format!("{}/v1/item/{}/claim", HOST, id))
                        .json(&serde_json::json!({
                            "participant_id": participant,
                            "quantity": quantity,
                            "expected_version": version,
                        }))
                        .send()
                        .await?;
                    match res.status() {
                        StatusCode::OK => {
                            let body = res.json::<ClaimResponse>().await?;
                            println!("claimed item {}, new version = {}", id, body.new_version);
                        }
                        StatusCode::CONFLICT => {
                            let body = res.json::<ClaimResponse>().await?;
                            println!(
                                "someone changed item {} first (success={}), refetch at version {} and retry",
                                id, body.success, body.new_version
                            );
                        }
                        StatusCode::UNPROCESSABLE_ENTITY => {
                            println!("not enough unclaimed units left on item {}", id);
                        }
                        unexpected => {
                            println!("got unexpected status code, {}", unexpected);
                        }
                    }
                }
                ItemCmds::Release { participant } => {
                    let res = Client::new()
                        .delete(format!("{}/v1/item/{}/claim", HOST, id))
                        .json(&serde_json::json!({ "participant_id": participant }))
                        .send()
                        .await?;
                    match res.status() {
                        StatusCode::OK => {
                            println!("released claim on item {}", id);
                        }
                        StatusCode::FORBIDDEN => {
                            println!("you do not hold the claim on item {}", id);
                        }
                        StatusCode::NOT_FOUND => {
                            println!("no such item {}", id);
                        }
                        unexpected => {
                            println!("got unexpected status code, {}", unexpected);
                        }
                    }
                }
            }
        }
        Commands::Presence(presence) => {
            let action = match presence.command {
                PresenceCmds::Heartbeat => "heartbeat",
                PresenceCmds::Leave => "leave",
            };
            let res = Client::new()
                .post(format!("{}/v1/participant/{}/{}", HOST, presence.participant, action))
                .send()
                .await?;
            match res.status() {
                StatusCode::OK => {
                    println!("{} recorded for participant {}", action, presence.participant);
                }
                StatusCode::NOT_FOUND => {
                    println!("no such participant {}", presence.participant);
                }
                unexpected => {
                    println!("got unexpected status code, {}", unexpected);
                }
            }
        }
        Commands::Pay(pay) => match pay.command {
            PayCmds::Preview => {
                let res = Client::new()
                    .get(format!("{}/v1/session/{}/split", HOST, pay.session))
                    .send()
                    .await?;
                match res.status() {
                    StatusCode::OK => {
                        let body = res.json::<serde_json::Value>().await?;
                        println!("{}", serde_json::to_string_pretty(&body)?);
                    }
                    unexpected => {
                        println!("got unexpected status code, {}", unexpected);
                    }
                }
            }
            PayCmds::Validate {
                participant,
                amount,
                count,
                total,
            } => {
                let res = Client::new()
                    .post(format!("{}/v1/payment/validate", HOST))
                    .json(&serde_json::json!({
                        "session_id": pay.session,
                        "participant_id": participant,
                        "amount_cents": amount,
                        "split_method": "DYNAMIC_EQUAL",
                        "expected_participant_count": count,
                        "bill_total_cents": total,
                    }))
                    .send()
                    .await?;
                match res.status() {
                    StatusCode::OK => {
                        println!("amount {} accepted, proceed to payment", amount);
                    }
                    StatusCode::UNPROCESSABLE_ENTITY => {
                        let body = res.json::<serde_json::Value>().await?;
                        println!("rejected: {}", serde_json::to_string_pretty(&body)?);
                    }
                    StatusCode::NOT_FOUND => {
                        println!("unknown session or participant");
                    }
                    unexpected => {
                        println!("got unexpected status code, {}", unexpected);
                    }
                }
            }
        },
    };
    Ok(())
}
