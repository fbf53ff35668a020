use colored::Colorize;

pub fn handle_error(err: anyhow::Error) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), err);

    let msg = err.to_string().to_lowercase();

    if msg.contains("supabase url and anon key are required") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Point the CLI at your project with:");
        eprintln!("  {} export SUPABASE_URL=<url> SUPABASE_ANON_KEY=<key>", "$".dimmed());
    }

    if msg.contains("not found") && msg.contains("api key") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  List stored keys with:");
        eprintln!("  {} keyshelf key list", "$".dimmed());
    }

    if msg.contains("jwt") || msg.contains("permission denied") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Sign in again with:");
        eprintln!("  {} keyshelf auth login <email>", "$".dimmed());
    }

    if msg.contains("connection refused") || msg.contains("network") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Check your internet connection and try again.");
    }

    std::process::exit(1);
}
