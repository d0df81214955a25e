use anyhow::{bail, Result};
use clap::Parser;

use party_server::admin_auth::hash_password;

/// Prints an argon2 hash to paste into `[admin].password_hash`.
#[derive(Parser, Debug)]
struct CliArgs {
    /// The admin password to hash.
    pub password: String,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    if cli_args.password.is_empty() {
        bail!("Password must not be empty");
    }

    println!("{}", hash_password(&cli_args.password)?);
    Ok(())
}
