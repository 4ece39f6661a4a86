use std::env;
use std::process;
use std::time::Duration;

use domain::adapters::memory_repo::InMemoryUserRepo;
use domain::service::UserService;
use domain::NewUser;

fn print_usage() {
    eprintln!(
        "{}\n\nUsage:\n  domain create <name> <email>\n  domain list\n\nNotes:\n  - This demo CLI uses an in-memory repository; data is not persisted across runs.",
        domain::about()
    );
}

async fn run() -> Result<(), String> {
    let mut args = env::args().skip(1); // skip program name

    let Some(cmd) = args.next() else {
        print_usage();
        return Ok(());
    };

    // Construct a demo service with in-memory storage and the simulated
    // backend latency turned off.
    let repo = InMemoryUserRepo::new();
    let svc = UserService::new(repo, Duration::ZERO);

    match cmd.as_str() {
        "create" => {
            let Some(name) = args.next() else {
                return Err("missing <name> for create".into());
            };
            let Some(email) = args.next() else {
                return Err("missing <email> for create".into());
            };
            if let Some(unk) = args.next() {
                return Err(format!("unknown argument: {}", unk));
            }

            let input = NewUser { name, email };
            match svc.create_user(input).await {
                Ok(user) => {
                    println!("created: #{} {} <{}>", user.id, user.name, user.email);
                    Ok(())
                }
                Err(e) => Err(format!("create failed: {}", e)),
            }
        }
        "list" => {
            match svc.list_users().await {
                Ok(users) if users.is_empty() => {
                    println!("no users");
                    Ok(())
                }
                Ok(users) => {
                    for user in users {
                        println!("#{} {} <{}>", user.id, user.name, user.email);
                    }
                    Ok(())
                }
                Err(e) => Err(format!("list failed: {}", e)),
            }
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(msg) = run().await {
        eprintln!("error: {}", msg);
        process::exit(1);
    }
}
