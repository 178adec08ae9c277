use std::error::Error;
use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use ghg_emissions_engine::{
    ActivityInput, ActivityPayload, EmissionEngine, EngineConfig, FugitiveInput, FugitiveMethod,
    InMemoryFactorStore, InMemoryReportStore, MobileCombustionInput, MobileMethod,
    PurchasedElectricityInput, Report, StationaryCombustionInput,
};

const FACTORS: &str = include_str!("../data/factors.json");

fn main() -> Result<(), Box<dyn Error>> {
    // Optional first argument: path to an engine TOML config.
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_file(Path::new(&path))?,
        None => EngineConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let factors = InMemoryFactorStore::from_json(FACTORS)?;
    let reports = InMemoryReportStore::new();
    let report_id = reports.insert(Report::new("acme-dublin", 2023, "Ireland"));
    let engine = EmissionEngine::new(factors, reports, config);
    info!(
        factors = engine.factors().len(),
        gwp_set = ?engine.config().gwp_set,
        "engine ready"
    );

    // A small Dublin site: backup generator, two vans, a chiller, grid power.
    let activities = vec![
        ActivityInput::new(ActivityPayload::StationaryCombustion(
            StationaryCombustionInput {
                consumption_quantity: Some(1000.0),
                fuel_type: Some("Diesel".to_string()),
                equipment: Some("Backup generator".to_string()),
            },
        ))
        .with_unit("litre"),
        ActivityInput::new(ActivityPayload::StationaryCombustion(
            StationaryCombustionInput {
                consumption_quantity: Some(52_000.0),
                fuel_type: Some("Natural Gas".to_string()),
                equipment: Some("Boiler".to_string()),
            },
        )),
        ActivityInput::new(ActivityPayload::MobileCombustion(MobileCombustionInput {
            calculation_method: Some(MobileMethod::DistanceBased),
            distance_traveled: Some(18_400.0),
            vehicle_type: Some("Van".to_string()),
            fuel_type: Some("Diesel".to_string()),
            ..Default::default()
        }))
        .with_unit("km"),
        ActivityInput::new(ActivityPayload::Fugitive(FugitiveInput {
            calculation_method: Some(FugitiveMethod::MassBalance),
            refrigerant_type: Some("R-410A".to_string()),
            beginning_inventory: Some(100.0),
            purchases: Some(50.0),
            sales_transfers: Some(20.0),
            ending_inventory: Some(110.0),
            ..Default::default()
        })),
        ActivityInput::new(ActivityPayload::PurchasedElectricity(
            PurchasedElectricityInput {
                consumption_quantity: Some(10_000.0),
                renewable_energy_portion: Some(4_000.0),
            },
        ))
        .with_unit("kWh"),
    ];

    for input in activities {
        let outcome = engine.add_activity(report_id, input)?;
        if let Some(result) = outcome.activity.result() {
            println!(
                "{},{:?},{},{:.3},{:.3}",
                outcome.activity.id,
                result.method,
                result.factor.source,
                result.factor.value,
                result.total_co2e_emissions
            );
        }
    }

    let summary = engine.recalculate_summary(report_id)?;
    println!("{}", serde_json::to_string_pretty(&summary.in_tonnes())?);

    Ok(())
}
