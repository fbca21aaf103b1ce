use std::io::{BufRead, Write};

use anyhow::anyhow;
use serde::Serialize;

use super::{
    args::Command,
    search::load_search,
    sharing::{share_table, unshare_table},
    table_definition::TableDefinition,
};
use crate::catalog::{Table, TableFeatures, TileOptions, Transport, VectorClient};
use crate::geofile::geojson::{feature_count, read_feature_collection, write_feature_collection};

/// Where commands print their results and ask for confirmation.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask a yes/no question, defaulting to no. Anything but yes aborts.
    pub fn confirm(&mut self, prompt: &str) -> anyhow::Result<()> {
        write!(self.output, "{} [y/N]: ", prompt)?;
        self.output.flush()?;
        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => Ok(()),
            _ => Err(anyhow!("Aborted!")),
        }
    }

    pub fn print_json<S: Serialize + ?Sized>(&mut self, value: &S) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(self.output, "{}", json)?;
        Ok(())
    }

    pub fn println(&mut self, line: &str) -> anyhow::Result<()> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

/// Run a command. Local input is read and validated before anything is sent to the service.
pub fn run<T, R, W>(
    command: Command,
    client: &VectorClient<T>,
    console: &mut Console<R, W>,
) -> anyhow::Result<()>
where
    T: Transport,
    R: BufRead,
    W: Write,
{
    match command {
        Command::CreateTable {
            config_file,
            auto_confirm,
        } => {
            let product = TableDefinition::from_file(&config_file)?.into_new_product();
            if !auto_confirm {
                console.confirm(&format!(
                    "Creating product: '{}', do you wish to continue?",
                    product.id
                ))?;
            }
            let table = Table::create(client, &product)?;
            console.print_json(table.parameters())
        }
        Command::DeleteTable {
            product_id,
            auto_confirm,
        } => {
            if !auto_confirm {
                console.confirm(&format!(
                    "Deleting product: '{}', do you wish to continue?",
                    product_id
                ))?;
            }
            client.delete_product(&product_id)?;
            console.println("Deleted.")
        }
        Command::ListTables { tag } => console.print_json(&client.list_products(&tag)?),
        Command::DescribeTable { product_id } => {
            console.print_json(&client.get_product(&product_id)?)
        }
        Command::Ingest {
            product_id,
            geojson_file,
            auto_confirm,
        } => {
            let feature_collection = read_feature_collection(&geojson_file)?;
            if !auto_confirm {
                console.confirm(&format!(
                    "Adding {} features to \"{}\", do you wish to continue?",
                    feature_count(&feature_collection),
                    product_id
                ))?;
            }
            let added =
                TableFeatures::from_value(client.add_features(&product_id, &feature_collection)?)?;
            console.print_json(&added.uuids())
        }
        Command::ListFeatures {
            product_id,
            search_json_file,
            search_json,
            output,
        } => {
            let query = load_search(search_json_file.as_deref(), search_json.as_deref())?;
            let features = client.query_features(&product_id, &query)?;
            match output {
                Some(output_filepath) => write_feature_collection(&features, &output_filepath),
                None => console.print_json(&features),
            }
        }
        Command::DescribeFeature {
            product_id,
            feature_id,
        } => console.print_json(&client.get_feature(&product_id, &feature_id)?),
        Command::DeleteFeature {
            product_id,
            feature_id,
            auto_confirm,
        } => {
            if !auto_confirm {
                console.confirm(&format!(
                    "Deleting feature \"{}\" from \"{}\", do you wish to continue?",
                    feature_id, product_id
                ))?;
            }
            client.delete_feature(&product_id, &feature_id)?;
            Ok(())
        }
        Command::ShareTable(args) => {
            let mut table = Table::get(client, &args.product_id)?;
            share_table(&mut table, args.role, &args.grantees())?;
            console.print_json(table.parameters())
        }
        Command::UnshareTable(args) => {
            let mut table = Table::get(client, &args.product_id)?;
            let unknown = unshare_table(&mut table, args.role, &args.grantees())?;
            for principal in unknown {
                console.println(&format!(
                    "\"{}\" was not a {} on \"{}\"",
                    principal,
                    args.role.name(),
                    args.product_id
                ))?;
            }
            Ok(())
        }
        Command::TileLayer {
            product_id,
            name,
            search_json_file,
            properties,
        } => {
            let query = load_search(search_json_file.as_deref(), None)?;
            if query.aoi.is_some() {
                log::warn!("The AOI of the search is not applied to tile layers");
            }
            let options = TileOptions {
                property_filter: query.filter,
                include_properties: (!properties.is_empty()).then_some(properties),
                styles: None,
            };
            console.print_json(&client.tile_layer(&product_id, &name, &options)?)
        }
    }
}
