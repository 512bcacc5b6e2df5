use crate::{Console, Result, TokenStore};
use std::io::{BufRead, Write};

pub fn handle_logout_command<R: BufRead, W: Write>(
    store: &TokenStore,
    console: &mut Console<R, W>,
) -> Result<()> {
    if store.remove()? {
        console.println(format!(
            "Removed session token from {}",
            store.path().display()
        ))
    } else {
        console.println("No session token cached")
    }
}
