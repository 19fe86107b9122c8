use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use stackable_nifi_pki::crd::DEFAULT_CLUSTER_DOMAIN;
use stackable_operator::logging::TracingTarget;

mod render;

mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Parser)]
#[clap(about, author, version)]
struct Opts {
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the NifiUsers that have to exist for a NifiCluster manifest
    Users {
        /// Path to the NifiCluster manifest
        #[clap(long)]
        cluster: PathBuf,

        /// Kubernetes cluster domain used for fully qualified names
        #[clap(long, env = "KUBERNETES_CLUSTER_DOMAIN", default_value = DEFAULT_CLUSTER_DOMAIN)]
        cluster_domain: String,

        /// Extra SAN added to every node certificate, e.g. an externally exposed hostname
        #[clap(long = "additional-san")]
        additional_sans: Vec<String>,
    },

    /// Print the distinguished name of a PEM encoded certificate
    Dn {
        /// Path to the certificate
        #[clap(long)]
        certificate: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();

    stackable_operator::logging::initialize_logging(
        "NIFI_PKI_LOG",
        "nifi-pki",
        TracingTarget::None,
    );
    tracing::debug!(
        built_info.pkg_version = built_info::PKG_VERSION,
        built_info.git_version = built_info::GIT_VERSION,
        built_info.target = built_info::TARGET,
        built_info.built_time_utc = built_info::BUILT_TIME_UTC,
        built_info.rustc_version = built_info::RUSTC_VERSION,
        "Starting {description}",
        description = built_info::PKG_DESCRIPTION
    );

    match opts.cmd {
        Command::Users {
            cluster,
            cluster_domain,
            additional_sans,
        } => {
            let manifest = std::fs::read_to_string(&cluster)
                .with_context(|| format!("failed to read {}", cluster.display()))?;
            print!(
                "{}",
                render::render_users(&manifest, &cluster_domain, &additional_sans)?
            );
        }
        Command::Dn { certificate } => {
            let pem = std::fs::read(&certificate)
                .with_context(|| format!("failed to read {}", certificate.display()))?;
            println!("{}", render::render_dn(&pem)?);
        }
    }

    Ok(())
}
