use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use policy_ledger::domain::{PolicyDraft, PolicyKind, UserId};
use policy_ledger::infra::{
    PgPolicyStore, PgStatsStore, PgUserDirectory, PolicyStore, StatsStore, UserDirectory,
};

fn print_help() {
    eprintln!(
        "\
policy-ledger-admin

USAGE:
  policy-ledger-admin <command> [options]

COMMANDS:
  migrate           Run database migrations
  seed-users        Insert development users
  publish           Publish a new policy version
  recalc-stats      Recompute acknowledgment rollups
  list-policies     Print the active policy per kind

COMMON OPTIONS:
  --database-url <postgres_url>   (defaults to env DATABASE_URL)

seed-users OPTIONS:
  --count <n>                     (default: 10)

publish OPTIONS:
  --kind <kind>                   (required) terms|privacy|code_of_conduct|trust_safety
  --title <text>                  (required)
  --content-file <path>           (required) File containing the policy text
  --published-by <uuid>           (optional) Defaults to the nil admin user
  --no-acknowledgment             (optional) Publish without requiring acknowledgment
"
    );
}

fn arg_value(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().cloned() else {
        print_help();
        std::process::exit(2);
    };

    let database_url = arg_value(&args, "--database-url")
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "postgres://localhost/policy_ledger".to_string());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    match command.as_str() {
        "migrate" => {
            policy_ledger::migrations::run_postgres(&pool).await?;
            println!("migrations applied");
        }
        "seed-users" => {
            policy_ledger::migrations::run_postgres(&pool).await?;
            let count: usize = arg_value(&args, "--count")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10);
            let directory = PgUserDirectory::new(pool.clone());
            for _ in 0..count {
                let user = UserId::new();
                directory.ensure_user(user).await?;
                println!("{user}");
            }
        }
        "publish" => {
            let kind: PolicyKind = arg_value(&args, "--kind")
                .ok_or_else(|| anyhow::anyhow!("--kind is required"))?
                .parse()
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            let title =
                arg_value(&args, "--title").ok_or_else(|| anyhow::anyhow!("--title is required"))?;
            let content_file = arg_value(&args, "--content-file")
                .ok_or_else(|| anyhow::anyhow!("--content-file is required"))?;
            let content = std::fs::read_to_string(&content_file)?;
            let published_by = arg_value(&args, "--published-by")
                .map(|v| Uuid::parse_str(&v))
                .transpose()?
                .map(UserId::from_uuid)
                .unwrap_or(UserId(Uuid::nil()));
            let requires_acknowledgment = !has_flag(&args, "--no-acknowledgment");

            let store = PgPolicyStore::new(pool.clone());
            let draft = PolicyDraft::new(kind, title, content, requires_acknowledgment);
            let outcome = store.publish(draft, published_by).await?;
            println!(
                "published {} v{} ({} users notified)",
                outcome.policy.policy_kind,
                outcome.policy.version,
                outcome.notifications.len()
            );
        }
        "recalc-stats" => {
            let stats = PgStatsStore::new(pool.clone());
            for rollup in stats.recalculate().await? {
                println!(
                    "{} v{}: {}/{} acknowledged, {} pending",
                    rollup.policy_kind,
                    rollup.version,
                    rollup.acknowledged_count,
                    rollup.total_users,
                    rollup.pending_count
                );
            }
        }
        "list-policies" => {
            let store = PgPolicyStore::new(pool.clone());
            for policy in store.load_current().await? {
                println!(
                    "{} v{} \"{}\" (requires acknowledgment: {})",
                    policy.policy_kind, policy.version, policy.title, policy.requires_acknowledgment
                );
            }
        }
        other => {
            eprintln!("unknown command: {other}");
            print_help();
            std::process::exit(2);
        }
    }

    Ok(())
}
