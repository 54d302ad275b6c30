use clap::{Parser, Subcommand};
use hpr_core::{
    compute_hash_index, config::data_file_from_env_value, AgeInput, CoreConfig, PatientInput,
    PatientService, DEFAULT_DATA_FILE,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "hpr")]
#[command(about = "Hospital patient record store CLI")]
struct Cli {
    /// Snapshot file to operate on (default: $PATIENT_DATA_FILE, then patients.yaml)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all patients
    List,
    /// Show one patient
    Get {
        /// Patient ID
        pid: String,
    },
    /// Add a patient
    Add {
        /// Patient ID
        pid: String,
        /// Full name
        name: String,
        /// Age in years (1-150)
        age: String,
        /// Gender (Male, Female, Other)
        gender: String,
        /// Disease or presenting condition
        disease: String,
        /// Attending doctor
        doctor: String,
    },
    /// Delete a patient
    Delete {
        /// Patient ID
        pid: String,
    },
    /// Print the hash bucket a patient ID maps to
    Hash {
        /// Patient ID
        pid: String,
    },
    /// Show how many patients each hash bucket holds
    Buckets,
}

fn resolve_data_file(flag: Option<PathBuf>, env_value: Option<String>) -> PathBuf {
    flag.or_else(|| data_file_from_env_value(env_value))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
}

fn open_service(flag: Option<PathBuf>) -> Result<PatientService, Box<dyn std::error::Error>> {
    let data_file = resolve_data_file(flag, std::env::var("PATIENT_DATA_FILE").ok());
    let cfg = Arc::new(CoreConfig::new(Some(data_file))?);
    Ok(PatientService::new(cfg)?)
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Some(Commands::Hash { pid }) => {
            println!("{}", compute_hash_index(&pid));
        }
        Some(Commands::List) => {
            let service = open_service(cli.data_file)?;
            let patients = service.list_patients()?;
            if patients.is_empty() {
                println!("No patients found.");
            } else {
                for p in patients {
                    println!(
                        "[{}] ID: {}, Name: {}, Age: {}, Gender: {}, Disease: {}, Doctor: {}",
                        p.hash_index(),
                        p.pid(),
                        p.name(),
                        p.age(),
                        p.gender(),
                        p.disease(),
                        p.doctor()
                    );
                }
            }
        }
        Some(Commands::Get { pid }) => {
            let service = open_service(cli.data_file)?;
            let p = service
                .get_patient(&pid)
                .map_err(|e| format!("Error fetching {}: {}", pid, e))?;
            println!("Patient ID: {}", p.pid());
            println!("Name:       {}", p.name());
            println!("Age:        {}", p.age());
            println!("Gender:     {}", p.gender());
            println!("Disease:    {}", p.disease());
            println!("Doctor:     {}", p.doctor());
            println!("Hash index: {}", p.hash_index());
        }
        Some(Commands::Add {
            pid,
            name,
            age,
            gender,
            disease,
            doctor,
        }) => {
            let service = open_service(cli.data_file)?;
            let input = PatientInput::new(pid, name, AgeInput::Text(age), gender, disease, doctor);
            let p = service
                .add_patient(&input)
                .map_err(|e| format!("Error adding patient: {}", e))?;
            println!("Added patient {} to bucket {}", p.pid(), p.hash_index());
        }
        Some(Commands::Delete { pid }) => {
            let service = open_service(cli.data_file)?;
            service
                .delete_patient(&pid)
                .map_err(|e| format!("Error deleting {}: {}", pid, e))?;
            println!("Deleted patient {}", pid);
        }
        Some(Commands::Buckets) => {
            let service = open_service(cli.data_file)?;
            for bucket in service.bucket_summary()? {
                println!(
                    "{}: {} patient(s) {}",
                    bucket.hash_index,
                    bucket.pids.len(),
                    bucket.pids.join(", ")
                );
            }
        }
        None => {
            println!("Use 'hpr --help' for commands");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_data_file_precedence() {
        assert_eq!(
            resolve_data_file(Some(PathBuf::from("a.yaml")), Some("b.yaml".into())),
            PathBuf::from("a.yaml")
        );
        assert_eq!(
            resolve_data_file(None, Some("b.yaml".into())),
            PathBuf::from("b.yaml")
        );
        assert_eq!(
            resolve_data_file(None, Some("  ".into())),
            PathBuf::from(DEFAULT_DATA_FILE)
        );
        assert_eq!(resolve_data_file(None, None), PathBuf::from(DEFAULT_DATA_FILE));
    }

    fn parse(data_file: &std::path::Path, args: &[&str]) -> Cli {
        let mut argv = vec!["hpr", "--data-file", data_file.to_str().expect("utf-8 path")];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("arguments should parse")
    }

    #[test]
    fn test_failed_commands_return_errors() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let data_file = temp_dir.path().join("patients.yaml");
        let add = ["add", "P1", "Alice", "30", "Female", "Flu", "Dr. X"];

        run(parse(&data_file, &add)).expect("first add should succeed");

        let err = run(parse(&data_file, &add)).expect_err("duplicate add should fail");
        assert_eq!(err.to_string(), "Error adding patient: Patient ID already exists");

        run(parse(&data_file, &["get", "P1"])).expect("get should succeed");
        run(parse(&data_file, &["delete", "P1"])).expect("delete should succeed");

        let err = run(parse(&data_file, &["get", "P1"])).expect_err("P1 is gone");
        assert_eq!(err.to_string(), "Error fetching P1: Patient not found");
        assert!(run(parse(&data_file, &["delete", "P1"])).is_err());
    }

    #[test]
    fn test_cli_parses_add() {
        let cli = Cli::try_parse_from([
            "hpr", "--data-file", "x.yaml", "add", "P1", "Alice", "30", "Female", "Flu", "Dr. X",
        ])
        .expect("arguments should parse");

        assert_eq!(cli.data_file, Some(PathBuf::from("x.yaml")));
        assert!(matches!(
            cli.command,
            Some(Commands::Add { ref pid, ref age, .. }) if pid == "P1" && age == "30"
        ));
    }
}
