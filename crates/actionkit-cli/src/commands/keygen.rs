// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Application key generation command.

use actionkit::TokenCipher;
use console::style;

/// Prints a new `base64:` application key on stdout.
pub fn run() -> anyhow::Result<()> {
    let key = TokenCipher::generate_key();
    println!("{}", key);
    eprintln!(
        "{} add it to {} as {}",
        style("Hint:").dim(),
        style(crate::config::CONFIG_FILE).cyan(),
        style("[app] key = \"...\"").cyan()
    );
    Ok(())
}
