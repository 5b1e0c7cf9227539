use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use vax_core::{
    constants::DEFAULT_DATA_DIR, open_store, CoreConfig, DoctorId, NewVaccine, NonEmptyText,
    Patient, SchedulePreview, Services, SystemClock,
};

#[derive(Parser)]
#[command(name = "vax")]
#[command(about = "Pediatric vaccination schedule tracker CLI")]
struct Cli {
    /// Directory of the YAML store (default: $VAX_DATA_DIR, then ./vax_data)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the mandatory vaccines required for a birth date
    Schedule {
        /// Date of birth (YYYY-MM-DD)
        birth_date: NaiveDate,
        /// Evaluate on this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Manage the vaccine catalog
    Vaccines {
        #[command(subcommand)]
        action: VaccineCommands,
    },
    /// Inspect patients
    Patients {
        #[command(subcommand)]
        action: PatientCommands,
    },
    /// Create a doctor account
    RegisterDoctor { username: String, password: String },
}

#[derive(Subcommand)]
enum VaccineCommands {
    /// List the catalog
    List,
    /// Add a vaccine
    Add {
        name: String,
        /// Recommended age in months
        #[arg(long)]
        month: Option<i32>,
        /// Mark the vaccine as optional
        #[arg(long)]
        optional: bool,
    },
    /// Load the national schedule into an empty catalog
    Seed,
}

#[derive(Subcommand)]
enum PatientCommands {
    /// List patients, optionally only those of one doctor
    List {
        #[arg(long)]
        doctor: Option<i64>,
    },
}

fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| {
        std::env::var("VAX_DATA_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    })
    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

fn render_preview(preview: &SchedulePreview) -> String {
    let mut out = format!(
        "Age on {}: {} months\n",
        preview.evaluated_on, preview.age_months
    );
    if preview.required.is_empty() {
        out.push_str("No mandatory vaccines required yet.\n");
    }
    for vaccine in &preview.required {
        let month = vaccine
            .recommended_month
            .map(|m| m.to_string())
            .unwrap_or_else(|| "-".into());
        out.push_str(&format!("  [{}] {} (month {})\n", vaccine.id, vaccine.name, month));
    }
    out
}

fn render_patient(patient: &Patient) -> String {
    format!(
        "ID: {}, Name: {} {}, National ID: {}, Born: {}, Doctor: {}",
        patient.id,
        patient.first_name,
        patient.last_name,
        patient.national_id,
        patient.birth_date,
        patient.doctor_id
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'vax --help' for commands");
        return Ok(());
    };

    let data_dir = resolve_data_dir(cli.data_dir);
    let cfg = CoreConfig::new(Some(data_dir), CoreConfig::default().session_ttl(), false)?;
    let store = open_store(&cfg)?;
    let services = Services::new(&cfg, store, Arc::new(SystemClock));

    match command {
        Commands::Schedule {
            birth_date,
            today,
            json,
        } => {
            let preview = services.schedule.preview(birth_date, today)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&preview)?);
            } else {
                print!("{}", render_preview(&preview));
            }
        }
        Commands::Vaccines { action } => match action {
            VaccineCommands::List => {
                let vaccines = services.catalog.list()?;
                if vaccines.is_empty() {
                    println!("Catalog is empty. Run 'vax vaccines seed' to load the national schedule.");
                }
                for v in vaccines {
                    println!(
                        "ID: {}, Name: {}, Mandatory: {}, Month: {}",
                        v.id,
                        v.name,
                        v.is_mandatory,
                        v.recommended_month
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "-".into())
                    );
                }
            }
            VaccineCommands::Add {
                name,
                month,
                optional,
            } => {
                let vaccine = services.catalog.create(NewVaccine {
                    name: NonEmptyText::new(&name)?,
                    is_mandatory: !optional,
                    recommended_month: month,
                })?;
                println!("Added vaccine {} with ID: {}", vaccine.name, vaccine.id);
            }
            VaccineCommands::Seed => {
                let added = services.catalog.seed_national_schedule()?;
                if added == 0 {
                    println!("Catalog already has entries; nothing seeded.");
                } else {
                    println!("Seeded {added} vaccines.");
                }
            }
        },
        Commands::Patients {
            action: PatientCommands::List { doctor },
        } => {
            let patients = match doctor {
                Some(id) => services.patients.list_for_doctor(DoctorId(id))?,
                None => services.patients.list_all()?,
            };
            if patients.is_empty() {
                println!("No patients found.");
            }
            for patient in &patients {
                println!("{}", render_patient(patient));
            }
        }
        Commands::RegisterDoctor { username, password } => {
            let doctor = services.accounts.register(&username, &password)?;
            println!("Registered doctor {} with ID: {}", doctor.username, doctor.id);
        }
    }

    Ok(())
}
