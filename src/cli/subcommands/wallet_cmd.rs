// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{io::Write, path::PathBuf};

use anyhow::Context as _;
use clap::Subcommand;

use super::CommandContext;
use crate::eth::EthAddress;
use crate::key_management::{Key, KeyInfo, Wallet};
use crate::shim::crypto::SignatureType;

#[derive(Debug, Subcommand)]
pub enum WalletCommands {
    /// Create a new wallet
    New {
        /// The signature type to use. One of secp256k1, bls or delegated
        #[arg(default_value = "secp256k1")]
        signature_type: SignatureType,
    },
    /// List addresses of the wallet
    List,
    /// Import a key exported with `lotus wallet export`
    Import {
        /// File holding the hex encoded key. Read from stdin when omitted
        path: Option<PathBuf>,
    },
    /// Export a key in the format of `lotus wallet export`
    Export {
        /// The address that contains the key to export
        address: String,
    },
    /// Print the default address, or set it when an address is given
    Default {
        address: Option<String>,
    },
    /// Sign a hex encoded message, printing `hex(type || signature)`
    Sign {
        /// The hex encoded message to sign
        #[arg(short)]
        message: String,
        /// The address used to sign. Defaults to the default wallet
        #[arg(short)]
        address: Option<String>,
    },
    /// Print the Ethereum address of a secp256k1 or delegated key
    EthAddr {
        /// The address of the key. Defaults to the default wallet
        address: Option<String>,
    },
}

impl WalletCommands {
    pub async fn run(self, ctx: CommandContext) -> anyhow::Result<()> {
        ctx.set_network(None).await?;
        let mut wallet = ctx.wallet()?;
        self.run_with(&ctx, &mut wallet, &mut std::io::stdout())
    }

    fn run_with(
        self,
        ctx: &CommandContext,
        wallet: &mut Wallet,
        out: &mut impl Write,
    ) -> anyhow::Result<()> {
        match self {
            Self::New { signature_type } => {
                let addr = wallet.generate_addr(signature_type)?;
                writeln!(out, "{addr}")?;
            }
            Self::List => {
                let default = wallet.get_default()?;
                writeln!(out, "{:86} Default", "Address")?;
                for addr in wallet.list_addrs()? {
                    let mark = if default == Some(addr) { "X" } else { "" };
                    writeln!(out, "{:86} {mark}", addr.to_string())?;
                }
            }
            Self::Import { path } => {
                let encoded = match path {
                    Some(path) => std::fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?,
                    None => {
                        let mut line = String::new();
                        std::io::stdin().read_line(&mut line)?;
                        line
                    }
                };
                let key_info = KeyInfo::from_lotus_hex(&encoded)?;
                let addr = wallet.import(key_info)?;
                writeln!(out, "{addr}")?;
            }
            Self::Export { address } => {
                let addr = ctx.signer(wallet, Some(&address))?;
                writeln!(out, "{}", wallet.export(&addr)?.to_lotus_hex()?)?;
            }
            Self::Default { address: None } => match wallet.get_default()? {
                Some(addr) => writeln!(out, "{addr}")?,
                None => writeln!(out, "No default wallet address set")?,
            },
            Self::Default {
                address: Some(address),
            } => {
                let addr = ctx.signer(wallet, Some(&address))?;
                wallet.set_default(&addr)?;
            }
            Self::Sign { message, address } => {
                let addr = ctx.signer(wallet, address.as_deref())?;
                let message = hex::decode(message.trim_start_matches("0x"))
                    .context("message must be hex encoded")?;
                let sig = wallet.sign(&addr, &message)?;
                writeln!(out, "{}", hex::encode(sig.to_bytes()))?;
            }
            Self::EthAddr { address } => {
                let addr = ctx.signer(wallet, address.as_deref())?;
                let key = Key::try_from(wallet.export(&addr)?)?;
                let eth = match key.key_info.key_type() {
                    SignatureType::Secp256k1 | SignatureType::Delegated => {
                        EthAddress::eth_address_from_pub_key(&key.public_key)?
                    }
                    SignatureType::Bls => {
                        anyhow::bail!("{addr} is a BLS key, it has no Ethereum address")
                    }
                };
                writeln!(out, "{eth}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli_shared::cli::Config;
    use crate::key_management::{KeyStore, KeyStoreConfig};
    use crate::shim::address::parse_address;

    fn run(cmd: WalletCommands, wallet: &mut Wallet) -> anyhow::Result<String> {
        let ctx = CommandContext::new(Config::default());
        let mut out = Vec::new();
        cmd.run_with(&ctx, wallet, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn memory_wallet() -> Wallet {
        Wallet::new(KeyStore::new(KeyStoreConfig::Memory).unwrap())
    }

    #[test]
    fn new_list_and_default() {
        let mut wallet = memory_wallet();
        let out = run(
            WalletCommands::New {
                signature_type: SignatureType::Bls,
            },
            &mut wallet,
        )
        .unwrap();
        let addr = parse_address(out.trim()).unwrap();

        let listing = run(WalletCommands::List, &mut wallet).unwrap();
        assert!(listing.lines().any(|l| l.starts_with(&addr.to_string()) && l.ends_with('X')));

        let default = run(WalletCommands::Default { address: None }, &mut wallet).unwrap();
        assert_eq!(default.trim(), addr.to_string());
    }

    #[test]
    fn export_then_import_elsewhere() {
        let mut wallet = memory_wallet();
        let addr = wallet.generate_addr(SignatureType::Secp256k1).unwrap();
        let exported = run(
            WalletCommands::Export {
                address: addr.to_string(),
            },
            &mut wallet,
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key");
        std::fs::write(&path, &exported).unwrap();
        let mut other = memory_wallet();
        let imported = run(WalletCommands::Import { path: Some(path) }, &mut other).unwrap();
        assert_eq!(imported.trim(), addr.to_string());
    }

    #[test]
    fn sign_prefixes_signature_type() {
        let mut wallet = memory_wallet();
        let addr = wallet.generate_addr(SignatureType::Secp256k1).unwrap();
        let out = run(
            WalletCommands::Sign {
                message: "0xdeadbeef".into(),
                address: None,
            },
            &mut wallet,
        )
        .unwrap();
        let bytes = hex::decode(out.trim()).unwrap();
        assert_eq!(bytes.len(), 66);
        assert_eq!(bytes[0], 1);
        let sig = crate::shim::crypto::Signature::from_bytes(&bytes).unwrap();
        sig.verify(&[0xde, 0xad, 0xbe, 0xef], &addr).unwrap();

        assert!(
            run(
                WalletCommands::Sign {
                    message: "zz".into(),
                    address: None,
                },
                &mut wallet,
            )
            .is_err()
        );
    }

    #[test]
    fn eth_addr_of_known_key() {
        let mut wallet = memory_wallet();
        let mut private_key = vec![0u8; 32];
        private_key[31] = 1;
        wallet
            .import(KeyInfo::new(SignatureType::Secp256k1, private_key))
            .unwrap();
        let out = run(WalletCommands::EthAddr { address: None }, &mut wallet);
        // imported keys do not become the default
        assert!(out.is_err());

        let addr = wallet.list_addrs().unwrap()[0];
        let out = run(
            WalletCommands::EthAddr {
                address: Some(addr.to_string()),
            },
            &mut wallet,
        )
        .unwrap();
        assert_eq!(out.trim(), "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf");

        let bls = wallet.generate_addr(SignatureType::Bls).unwrap();
        assert!(
            run(
                WalletCommands::EthAddr {
                    address: Some(bls.to_string()),
                },
                &mut wallet,
            )
            .is_err()
        );
    }
}
