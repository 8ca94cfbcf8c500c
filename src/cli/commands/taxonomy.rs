//! Taxonomy and certification lookup commands.

use crate::config::Config;
use crate::taxonomy::{CertificationTable, Country, TaxonomyDomain, TaxonomyRegistry};

use super::effective_locale;

/// List all known genres
pub fn cmd_genres(config: &Config, locale: Option<&str>) -> anyhow::Result<()> {
    let registry = TaxonomyRegistry::new();
    let locale = effective_locale(config, locale);
    let genres = registry.values(TaxonomyDomain::Genre);

    println!("Genres ({}, locale {})", genres.len(), locale);
    println!("======");
    for genre in &genres {
        println!(
            "  {:>3}  {:<18} {}",
            genre.canonical_id,
            genre.canonical_name,
            registry.localized_name(genre, locale)
        );
    }
    Ok(())
}

/// Resolve free text to a taxonomy value
pub fn cmd_resolve(
    config: &Config,
    text: &str,
    domain: &str,
    locale: Option<&str>,
) -> anyhow::Result<()> {
    let domain = TaxonomyDomain::parse(domain)
        .ok_or_else(|| anyhow::anyhow!("Unknown domain '{}' (expected genre or source)", domain))?;
    let registry = TaxonomyRegistry::new();
    let known = registry.find(domain, text).is_some();

    let Some(value) = registry.resolve(domain, text) else {
        println!("Nothing to resolve in {:?}", text);
        return Ok(());
    };

    println!("Domain:    {}", domain);
    println!("Canonical: {} (#{})", value.canonical_name, value.canonical_id);
    println!(
        "Name:      {}",
        registry.localized_name(&value, effective_locale(config, locale))
    );
    if !known {
        println!("Not a known value; registered as new.");
    } else if !value.alternate_names.is_empty() {
        println!("Also:      {}", value.alternate_names.join(", "));
    }
    Ok(())
}

/// Resolve a certification for a country
pub fn cmd_certification(config: &Config, text: &str, country: Option<&str>) -> anyhow::Result<()> {
    let country = match country {
        Some(code) => Country::parse(code).ok_or_else(|| {
            let known: Vec<_> = Country::ALL.iter().map(|c| c.code()).collect();
            anyhow::anyhow!("Unknown country '{}' (known: {})", code, known.join(", "))
        })?,
        None => config.scraper.certification_country,
    };

    let table = CertificationTable::new();
    match table.resolve(country, text) {
        Some(cert) => {
            println!("{} {} (ages {}+)", cert.country, cert.name, cert.age);
        }
        None => {
            let names: Vec<_> = table.values(country).iter().map(|c| c.name).collect();
            println!("No {} certification matches {:?}", country, text);
            println!("Known: {}", names.join(", "));
        }
    }
    Ok(())
}
