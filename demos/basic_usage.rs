//! Basic usage example for the Sirene Search library.
//!
//! Looks up one legal unit, then searches active establishments created in
//! a given month in one postal code. Requires `INSEE_API_KEY`.

use sirene_search::models::{cell_text, EndpointKind, SearchRequest};
use sirene_search::{Config, SireneClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let client = SireneClient::new(&config)?;

    let record = client.lookup(EndpointKind::Siren, "552032534").await?;
    println!(
        "Lookup: {}",
        record["uniteLegale"]["periodesUniteLegale"][0]["denominationUniteLegale"]
    );

    let request = SearchRequest::new(EndpointKind::Siret)
        .query("codePostalEtablissement:75001 AND dateCreationEtablissement:2023-01")
        .fields("siret,dateCreationEtablissement,denominationUniteLegale")
        .page_size(100)
        .max_rows(250);

    let result = client.search(&request).await?;
    println!(
        "Fetched {} establishments (provider total: {:?})",
        result.table.len(),
        result.header.total
    );
    println!("Columns: {}", result.table.columns().join(", "));

    for row in 0..result.table.len().min(5) {
        println!(
            "  {}  {}",
            cell_text(result.table.get(row, "siret")),
            cell_text(result.table.get(row, "dateCreationEtablissement"))
        );
    }

    Ok(())
}
