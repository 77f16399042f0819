use std::io::Write;

use anyhow::Result;
use bing_webmaster::analysis::{InboundLinkSummary, QueryParameterSummary};
use bing_webmaster::cancellation::CancellationToken;
use bing_webmaster::config::PaginationConfig;
use bing_webmaster::WebmasterClient;
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show how many inbound links point at each page of a site
    LinkCounts {
        /// Verified site URL
        site_url: String,

        /// Page to fetch (ignored with --all)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        page: i64,

        /// Fetch and concatenate every page
        #[arg(long)]
        all: bool,
    },

    /// Analyse the inbound links pointing at one URL
    UrlLinks {
        /// Verified site URL
        site_url: String,

        /// Page of the site to analyse
        link: String,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<u64>,

        /// Number of entries in each top list
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Also list every link
        #[arg(short, long)]
        verbose: bool,
    },

    /// Manage connected pages
    Connected {
        #[command(subcommand)]
        action: ConnectedCommand,
    },

    /// Manage tracked query parameters
    Params {
        #[command(subcommand)]
        action: ParamsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConnectedCommand {
    /// List connected pages
    List {
        /// Verified site URL
        site_url: String,
    },
    /// Connect a page to the site
    Add {
        /// Verified site URL
        site_url: String,
        /// Page to connect
        master_url: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ParamsCommand {
    /// List tracked query parameters
    List {
        /// Verified site URL
        site_url: String,
    },
    /// Start tracking a parameter
    Add {
        /// Verified site URL
        site_url: String,
        /// Parameter name (letters, digits, colon)
        parameter: String,
    },
    /// Stop tracking a parameter
    Remove {
        /// Verified site URL
        site_url: String,
        /// Parameter name
        parameter: String,
    },
    /// Enable a tracked parameter
    Enable {
        /// Verified site URL
        site_url: String,
        /// Parameter name
        parameter: String,
    },
    /// Disable a tracked parameter
    Disable {
        /// Verified site URL
        site_url: String,
        /// Parameter name
        parameter: String,
    },
}

pub async fn run<W: Write>(
    client: &WebmasterClient,
    command: Command,
    cancel: &CancellationToken,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::LinkCounts { site_url, page, all } => {
            if all {
                let links = client
                    .links
                    .get_all_link_counts(&site_url, Some(cancel))
                    .await?;
                for link in &links {
                    writeln!(out, "{}\t{}", link.count(), link.url())?;
                }
                writeln!(out, "{} pages with inbound links", links.len())?;
            } else {
                let counts = client.links.get_link_counts(&site_url, page).await?;
                for link in &counts.links {
                    writeln!(out, "{}\t{}", link.count(), link.url())?;
                }
                writeln!(out, "Page {page} of {}", counts.total_pages)?;
            }
        }

        Command::UrlLinks {
            site_url,
            link,
            max_pages,
            top,
            verbose,
        } => {
            let mut pagination = client.links.pagination().clone();
            if let Some(max) = max_pages {
                pagination = pagination.with_max_pages(max);
            }
            let details = client
                .links
                .clone()
                .with_pagination(pagination)
                .get_all_url_links(&site_url, &link, Some(cancel))
                .await?;
            write_link_summary(out, &link, &InboundLinkSummary::from_details(&details), top)?;

            if verbose {
                writeln!(out, "\nAll links:")?;
                for detail in &details {
                    writeln!(out, "  {}\t{}", detail.url(), detail.anchor_text())?;
                }
            }
        }

        Command::Connected { action } => match action {
            ConnectedCommand::List { site_url } => {
                let pages = client.links.get_connected_pages(&site_url).await?;
                for page in &pages {
                    writeln!(out, "{}", page.url)?;
                }
                writeln!(out, "{} connected pages", pages.len())?;
            }
            ConnectedCommand::Add {
                site_url,
                master_url,
            } => {
                client
                    .links
                    .add_connected_page(&site_url, &master_url)
                    .await?;
                writeln!(
                    out,
                    "Connected {master_url} (it may take a while to appear in the list)"
                )?;
            }
        },

        Command::Params { action } => run_params(client, action, out).await?,
    }
    Ok(())
}

async fn run_params<W: Write>(
    client: &WebmasterClient,
    action: ParamsCommand,
    out: &mut W,
) -> Result<()> {
    match action {
        ParamsCommand::List { site_url } => {
            let params = client.urls.get_query_parameters(&site_url).await?;
            for param in &params {
                writeln!(
                    out,
                    "{}\t{}\t{}",
                    param.parameter,
                    param.status_label(),
                    param.date.format("%Y-%m-%d")
                )?;
            }
            let summary = QueryParameterSummary::from_parameters(&params);
            writeln!(
                out,
                "{} parameters ({} enabled, {} disabled)",
                summary.total(),
                summary.enabled.len(),
                summary.disabled.len()
            )?;
        }
        ParamsCommand::Add {
            site_url,
            parameter,
        } => {
            client.urls.add_query_parameter(&site_url, &parameter).await?;
            writeln!(out, "Added {parameter}")?;
        }
        ParamsCommand::Remove {
            site_url,
            parameter,
        } => {
            client
                .urls
                .remove_query_parameter(&site_url, &parameter)
                .await?;
            writeln!(out, "Removed {parameter}")?;
        }
        ParamsCommand::Enable {
            site_url,
            parameter,
        } => {
            client
                .urls
                .enable_disable_query_parameter(&site_url, &parameter, true)
                .await?;
            writeln!(out, "Enabled {parameter}")?;
        }
        ParamsCommand::Disable {
            site_url,
            parameter,
        } => {
            client
                .urls
                .enable_disable_query_parameter(&site_url, &parameter, false)
                .await?;
            writeln!(out, "Disabled {parameter}")?;
        }
    }
    Ok(())
}

fn write_link_summary<W: Write>(
    out: &mut W,
    link: &str,
    summary: &InboundLinkSummary,
    top: usize,
) -> Result<()> {
    writeln!(out, "Inbound links to {link}")?;
    writeln!(out, "  Total links:    {}", summary.total_links)?;
    writeln!(out, "  Unique domains: {}", summary.unique_domains())?;

    writeln!(out, "\nTop domains:")?;
    for (domain, count) in summary.top_domains(top) {
        writeln!(out, "  {count:>5}  {domain}")?;
    }

    writeln!(out, "\nTop anchor texts:")?;
    for (anchor, count) in summary.top_anchor_texts(top) {
        writeln!(out, "  {count:>5}  {anchor}")?;
    }
    Ok(())
}
