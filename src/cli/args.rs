use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::sharing::{Grantees, Role};

/// Command-line client of the vector catalog service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a YAML client config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the catalog service. Overrides the config file and VECTOR_API_HOST.
    #[arg(long, global = true)]
    pub api_host: Option<String>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Create a new table from a TOML table definition
    CreateTable {
        config_file: PathBuf,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        auto_confirm: bool,
    },

    /// Delete a table
    DeleteTable {
        product_id: String,
        #[arg(short = 'y', long)]
        auto_confirm: bool,
    },

    /// List the available tables
    ListTables {
        /// Tag(s) a table must have to be listed
        #[arg(short, long)]
        tag: Vec<String>,
    },

    /// Describe the table with the given ID
    DescribeTable { product_id: String },

    /// Ingest a GeoJSON FeatureCollection from a file
    Ingest {
        product_id: String,
        geojson_file: PathBuf,
        #[arg(short = 'y', long)]
        auto_confirm: bool,
    },

    /// List the features of a table, optionally filtered
    ListFeatures {
        product_id: String,
        /// File containing the search JSON (aoi and filter)
        #[arg(short = 'f', long)]
        search_json_file: Option<PathBuf>,
        /// Search JSON given inline (overrides the file)
        #[arg(short = 'j', long)]
        search_json: Option<String>,
        /// Write the features to this GeoJSON file instead of printing them
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Describe a feature of a table
    DescribeFeature {
        product_id: String,
        feature_id: String,
    },

    /// Delete a feature from a table
    DeleteFeature {
        product_id: String,
        feature_id: String,
        #[arg(short = 'y', long)]
        auto_confirm: bool,
    },

    /// Grant a role on a table
    ShareTable(ShareArgs),

    /// Revoke a role on a table
    UnshareTable(ShareArgs),

    /// Print the vector tile layer of a table for display on a map
    TileLayer {
        product_id: String,
        /// Name of the layer
        name: String,
        /// Search JSON file whose filter is applied to the tiles (the AOI is ignored)
        #[arg(short = 'f', long)]
        search_json_file: Option<PathBuf>,
        /// Property to include in the tiles
        #[arg(short = 'p', long = "property")]
        properties: Vec<String>,
    },
}

#[derive(Args, Debug, PartialEq)]
pub struct ShareArgs {
    pub product_id: String,
    #[arg(long, value_enum)]
    pub role: Role,
    /// Organization(s) to share with
    #[arg(long)]
    pub org: Vec<String>,
    /// User ID(s) to share with
    #[arg(long)]
    pub user: Vec<String>,
    /// Group(s) to share with
    #[arg(long)]
    pub group: Vec<String>,
    /// Email(s) to share with
    #[arg(long)]
    pub email: Vec<String>,
}

impl ShareArgs {
    pub fn grantees(&self) -> Grantees {
        Grantees {
            orgs: self.org.clone(),
            users: self.user.clone(),
            groups: self.group.clone(),
            emails: self.email.clone(),
        }
    }
}
