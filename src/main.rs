use env_logger::Env;
use log::{error, info, warn};
use rust_decimal::Decimal;
use sigepark::config::Config;
use sigepark::workflow::{Attendant, ChargeSource, Stage};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "Comandos:
  login <email> <contraseña>   iniciar sesión
  list                         vehículos dentro
  plate <PLACA>                validar placa (entrada o salida)
  tariff <id>                  registrar entrada con la tarifa elegida
  pay <monto>                  cobrar y registrar salida
  cancel                       volver al inicio
  help                         esta ayuda
  quit                         salir";

#[derive(Debug, PartialEq)]
enum Command {
    Login { email: String, password: String },
    List,
    Plate(String),
    Tariff(i32),
    Pay(Decimal),
    Cancel,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let name = words.next().unwrap_or("").to_lowercase();
    let rest: Vec<&str> = words.collect();
    match (name.as_str(), rest.as_slice()) {
        ("login", [email, password]) => Ok(Command::Login {
            email: email.to_string(),
            password: password.to_string(),
        }),
        ("login", _) => Err("Uso: login <email> <contraseña>".to_string()),
        ("list", []) => Ok(Command::List),
        ("plate", words) => Ok(Command::Plate(words.join(""))),
        ("tariff", [id]) => id
            .parse()
            .map(Command::Tariff)
            .map_err(|_| format!("Tarifa inválida: {}", id)),
        ("pay", [amount]) => amount
            .replace(',', ".")
            .parse()
            .map(Command::Pay)
            .map_err(|_| format!("Monto inválido: {}", amount)),
        ("cancel", []) => Ok(Command::Cancel),
        ("help", _) | ("", _) => Ok(Command::Help),
        ("quit", _) | ("exit", _) => Ok(Command::Quit),
        _ => Err(format!("Comando desconocido: {}", line.trim())),
    }
}

fn describe_stage(stage: &Stage) -> String {
    match stage {
        Stage::Idle => "Listo".to_string(),
        Stage::EntryPending { plate, tariffs } => {
            let mut text = format!("{} no está dentro. Seleccione una tarifa:", plate);
            for tariff in tariffs {
                text.push_str(&format!("\n  [{}] {}", tariff.id, tariff.name));
            }
            text
        }
        Stage::ExitPending { plate, due, source } => match source {
            ChargeSource::Server => format!("{} está dentro. Valor a cobrar: {}", plate, due),
            ChargeSource::Fallback {
                entered_at,
                hours_billed,
            } => format!(
                "{} está dentro desde {} ({} h). Valor a cobrar (estimado): {}",
                plate,
                entered_at.format("%Y-%m-%d %H:%M"),
                hours_billed,
                due
            ),
        },
    }
}

async fn run_command(attendant: &mut Attendant, command: Command) -> String {
    let result = match command {
        Command::Login { email, password } => attendant
            .login(&email, &password)
            .await
            .map(|auth| auth.message),
        Command::List => attendant.roster().await.map(|(vehicles, summary)| {
            let mut text = summary.render();
            for vehicle in &vehicles {
                let dwell = vehicle
                    .dwell
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string());
                text.push_str(&format!(
                    "\n  {:<8} {:<12} {}",
                    vehicle.plate, vehicle.category, dwell
                ));
            }
            text
        }),
        Command::Plate(plate) => attendant
            .submit_plate(&plate)
            .await
            .map(describe_stage),
        Command::Tariff(id) => attendant.choose_tariff(id).await.map(|ticket| {
            format!(
                "Entrada registrada. Ticket {} — {} ({}) {}",
                ticket.ticket, ticket.plate, ticket.vehicle_type, ticket.entered_at
            )
        }),
        Command::Pay(amount) => attendant.confirm_payment(amount).await.map(|receipt| {
            format!(
                "Salida registrada para {}. Cambio: {}",
                receipt.plate, receipt.change
            )
        }),
        Command::Cancel => {
            attendant.cancel();
            Ok(describe_stage(attendant.stage()))
        }
        Command::Help => Ok(HELP.to_string()),
        Command::Quit => Ok(String::new()),
    };
    match result {
        Ok(text) => text,
        Err(e) => {
            warn!("{:?}", e);
            e.to_string()
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("Starting sigepark");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:?}", e);
            std::process::exit(2);
        }
    };
    info!("Using API at {}", config.base_url);
    let mut attendant = match Attendant::new(&config) {
        Ok(attendant) => attendant,
        Err(e) => {
            error!("Unable to build HTTP client: {:?}", e);
            std::process::exit(2);
        }
    };

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Error reading stdin: {}", e);
                break;
            }
        };
        let output = match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => run_command(&mut attendant, command).await,
            Err(usage) => usage,
        };
        println!("{}", output);
    }
    info!("Exiting main");
}
