use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clinica::auth::{self, RegistrationForm};
use clinica::config::{ClientConfig, ConfigError};
use clinica::guard::{GuardDecision, evaluate_path, route_for};
use clinica::net::types::{
    AgendaSlot, Appointment, AppointmentStatus, CreatePaymentRequest, CreateSlotRequest, CreateUserRequest,
    DashboardKpis, Payment, PaymentMethod, Role, UpdateUserRequest,
};
use clinica::net::{ApiError, DEFAULT_PAGE_LIMIT, DateRange, NativeClient, connect};
use clinica::session::{FileStorage, SessionHandle};
use clinica::util::format::{
    StatusDisplay, format_currency, format_date, format_date_time, format_percent, format_time,
    payment_method_label,
};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("not signed in; run `clinica login` first")]
    NotSignedIn,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "clinica", about = "Clinic appointment system CLI")]
struct Cli {
    #[arg(long, env = "CLINICA_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "CLINICA_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Print human-readable lines instead of JSON where supported.
    #[arg(long, global = true, default_value_t = false)]
    plain: bool,

    #[command(subcommand)]
    command: Command,
}

struct CliContext {
    api: NativeClient,
    session: SessionHandle,
    plain: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long, env = "CLINICA_EMAIL")]
        email: String,
        #[arg(long, env = "CLINICA_PASSWORD")]
        password: String,
    },
    Register(RegisterArgs),
    Logout,
    Whoami,
    Doctors(DoctorsCommand),
    Agenda(AgendaCommand),
    Appointments(AppointmentsCommand),
    Payments(PaymentsCommand),
    Users(UsersCommand),
    Reports(ReportsCommand),
    /// Show what the router would do with a page path for the stored session.
    Guard {
        path: String,
    },
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    cpf: String,
    #[arg(long, env = "CLINICA_PASSWORD")]
    password: String,
    #[arg(long)]
    phone: Option<String>,
}

#[derive(Args, Debug)]
struct Paging {
    #[arg(long, default_value_t = 0)]
    skip: u32,
    #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
    limit: u32,
}

#[derive(Args, Debug)]
struct Period {
    /// `YYYY-MM-DD`
    #[arg(long)]
    start: Option<String>,
    /// `YYYY-MM-DD`
    #[arg(long)]
    end: Option<String>,
}

impl Period {
    fn range(&self) -> DateRange<'_> {
        DateRange { start: self.start.as_deref(), end: self.end.as_deref() }
    }
}

#[derive(Args, Debug)]
struct DoctorsCommand {
    #[command(subcommand)]
    command: DoctorsSubcommand,
}

#[derive(Subcommand, Debug)]
enum DoctorsSubcommand {
    List,
    Show {
        doctor_id: Uuid,
        #[arg(long, default_value_t = false)]
        profile: bool,
    },
}

#[derive(Args, Debug)]
struct AgendaCommand {
    #[command(subcommand)]
    command: AgendaSubcommand,
}

#[derive(Subcommand, Debug)]
enum AgendaSubcommand {
    Show {
        doctor_id: Uuid,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    AddSlot {
        doctor_id: Uuid,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    DeleteSlot {
        slot_id: Uuid,
    },
}

#[derive(Args, Debug)]
struct AppointmentsCommand {
    #[command(subcommand)]
    command: AppointmentsSubcommand,
}

#[derive(Subcommand, Debug)]
enum AppointmentsSubcommand {
    List(Paging),
    Book {
        slot_id: Uuid,
    },
    SetStatus {
        appointment_id: Uuid,
        status: AppointmentStatus,
    },
}

#[derive(Args, Debug)]
struct PaymentsCommand {
    #[command(subcommand)]
    command: PaymentsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PaymentsSubcommand {
    List(Paging),
    Show {
        payment_id: Uuid,
    },
    Pay {
        appointment_id: Uuid,
        #[arg(long)]
        amount: f64,
        #[arg(long, default_value = "pix")]
        method: PaymentMethod,
    },
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    List(Paging),
    Show {
        user_id: Uuid,
    },
    /// Create an account from a JSON body (`nome`, `email`, `password`, `role`, ...).
    Create {
        #[arg(long)]
        data: String,
    },
    Update {
        user_id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    Delete {
        user_id: Uuid,
    },
}

#[derive(Args, Debug)]
struct ReportsCommand {
    #[command(subcommand)]
    command: ReportsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ReportsSubcommand {
    Kpis,
    MyAppointments(Period),
    MyPayments(Period),
    Occupancy(Period),
    Revenue {
        #[arg(long)]
        year: i32,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = run(Cli::parse()).await {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;
    tracing::debug!(api_url = %config.api_url, state_dir = %config.state_dir.display(), "client configured");
    let session = SessionHandle::restore(FileStorage::new(&config.state_dir));
    let api = connect(&config, &session)?;
    let ctx = CliContext { api, session, plain: cli.plain };

    match cli.command {
        Command::Login { email, password } => {
            let signed_in = auth::login(&ctx.api, &ctx.session, &email, &password).await?;
            print_json(&json!({ "user": signed_in.user, "landing": signed_in.landing }))
        }
        Command::Register(args) => {
            let form = RegistrationForm {
                name: args.name,
                email: args.email,
                cpf: args.cpf,
                password: args.password,
                phone: args.phone,
            };
            let signed_in = auth::register_then_login(&ctx.api, &ctx.session, &form).await?;
            print_json(&json!({ "user": signed_in.user, "landing": signed_in.landing }))
        }
        Command::Logout => {
            auth::logout(&ctx.session);
            eprintln!("signed out");
            Ok(())
        }
        Command::Whoami => match auth::bootstrap(&ctx.api, &ctx.session).await? {
            Some(user) => print_json(&user),
            None => Err(CliError::NotSignedIn),
        },
        Command::Doctors(doctors) => run_doctors(&ctx, doctors).await,
        Command::Agenda(agenda) => run_agenda(&ctx, agenda).await,
        Command::Appointments(appointments) => run_appointments(&ctx, appointments).await,
        Command::Payments(payments) => run_payments(&ctx, payments).await,
        Command::Users(users) => run_users(&ctx, users).await,
        Command::Reports(reports) => run_reports(&ctx, reports).await,
        Command::Guard { path } => run_guard(&ctx.session, &path),
    }
}

fn load_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    let config = ClientConfig::from_env()?;
    if cli.api_url.is_none() && cli.state_dir.is_none() {
        return Ok(config);
    }
    let api_url = cli.api_url.as_deref().unwrap_or(&config.api_url);
    let state_dir = cli.state_dir.clone().unwrap_or_else(|| config.state_dir.clone());
    Ok(ClientConfig::build(api_url, config.timeouts, state_dir)?)
}

async fn run_doctors(ctx: &CliContext, doctors: DoctorsCommand) -> Result<(), CliError> {
    match doctors.command {
        DoctorsSubcommand::List => print_json(&ctx.api.list_doctors().await?),
        DoctorsSubcommand::Show { doctor_id, profile: false } => print_json(&ctx.api.get_doctor(doctor_id).await?),
        DoctorsSubcommand::Show { doctor_id, profile: true } => {
            print_json(&ctx.api.get_doctor_profile(doctor_id).await?)
        }
    }
}

async fn run_agenda(ctx: &CliContext, agenda: AgendaCommand) -> Result<(), CliError> {
    match agenda.command {
        AgendaSubcommand::Show { doctor_id, start, end } => {
            let slots = ctx.api.get_agenda(doctor_id, start.as_deref(), end.as_deref()).await?;
            if ctx.plain {
                slots.iter().for_each(|slot| println!("{}", slot_line(slot)));
                return Ok(());
            }
            print_json(&slots)
        }
        AgendaSubcommand::AddSlot { doctor_id, start, end } => {
            let body = CreateSlotRequest { start, end };
            print_json(&ctx.api.create_slot(doctor_id, &body).await?)
        }
        AgendaSubcommand::DeleteSlot { slot_id } => {
            ctx.api.delete_slot(slot_id).await?;
            eprintln!("deleted slot {slot_id}");
            Ok(())
        }
    }
}

async fn run_appointments(ctx: &CliContext, appointments: AppointmentsCommand) -> Result<(), CliError> {
    match appointments.command {
        AppointmentsSubcommand::List(paging) => {
            let page = ctx.api.list_appointments(paging.skip, paging.limit).await?;
            if ctx.plain {
                page.items.iter().for_each(|appointment| println!("{}", appointment_line(appointment)));
                eprintln!("{} of {}", page.items.len(), page.total);
                return Ok(());
            }
            print_json(&page)
        }
        AppointmentsSubcommand::Book { slot_id } => print_json(&ctx.api.create_appointment(slot_id).await?),
        AppointmentsSubcommand::SetStatus { appointment_id, status } => {
            print_json(&ctx.api.update_appointment_status(appointment_id, status).await?)
        }
    }
}

async fn run_payments(ctx: &CliContext, payments: PaymentsCommand) -> Result<(), CliError> {
    match payments.command {
        PaymentsSubcommand::List(paging) => {
            let page = ctx.api.list_payments(paging.skip, paging.limit).await?;
            if ctx.plain {
                page.items.iter().for_each(|payment| println!("{}", payment_line(payment)));
                eprintln!("{} of {}", page.items.len(), page.total);
                return Ok(());
            }
            print_json(&page)
        }
        PaymentsSubcommand::Show { payment_id } => print_json(&ctx.api.get_payment(payment_id).await?),
        PaymentsSubcommand::Pay { appointment_id, amount, method } => {
            let body = CreatePaymentRequest { appointment_id, amount, method };
            print_json(&ctx.api.create_payment(&body).await?)
        }
    }
}

async fn run_users(ctx: &CliContext, users: UsersCommand) -> Result<(), CliError> {
    match users.command {
        UsersSubcommand::List(paging) => print_json(&ctx.api.list_users(paging.skip, paging.limit).await?),
        UsersSubcommand::Show { user_id } => print_json(&ctx.api.get_user(user_id).await?),
        UsersSubcommand::Create { data } => {
            let body = serde_json::from_str::<CreateUserRequest>(&data)?;
            print_json(&ctx.api.create_user(&body).await?)
        }
        UsersSubcommand::Update { user_id, name, email, phone, active } => {
            let body = UpdateUserRequest { name, email, phone, active };
            print_json(&ctx.api.update_user(user_id, &body).await?)
        }
        UsersSubcommand::Delete { user_id } => {
            ctx.api.delete_user(user_id).await?;
            eprintln!("deleted user {user_id}");
            Ok(())
        }
    }
}

async fn run_reports(ctx: &CliContext, reports: ReportsCommand) -> Result<(), CliError> {
    match reports.command {
        ReportsSubcommand::Kpis => {
            let kpis = ctx.api.dashboard_kpis().await?;
            if ctx.plain {
                print_kpis(&kpis, ctx.session.role());
                return Ok(());
            }
            print_json(&kpis)
        }
        ReportsSubcommand::MyAppointments(period) => {
            print_json(&ctx.api.patient_appointments_report(period.range()).await?)
        }
        ReportsSubcommand::MyPayments(period) => print_json(&ctx.api.patient_payments_report(period.range()).await?),
        ReportsSubcommand::Occupancy(period) => print_json(&ctx.api.doctor_occupancy_report(period.range()).await?),
        ReportsSubcommand::Revenue { year } => print_json(&ctx.api.monthly_revenue(year).await?),
    }
}

fn run_guard(session: &SessionHandle, path: &str) -> Result<(), CliError> {
    let snapshot = session.snapshot();
    let page = route_for(path).map(|route| route.page);
    let decision = match evaluate_path(&snapshot, path) {
        GuardDecision::Render => json!({ "action": "render" }),
        GuardDecision::Redirect(to) => json!({ "action": "redirect", "to": to }),
        GuardDecision::AwaitProfile => json!({ "action": "await_profile" }),
    };
    print_json(&json!({ "path": path, "page": page, "decision": decision }))
}

// =============================================================================
// PLAIN OUTPUT
// =============================================================================

fn slot_line(slot: &AgendaSlot) -> String {
    format!(
        "{}  {}-{}  {:<10} {}",
        format_date(&slot.start),
        format_time(&slot.start),
        format_time(&slot.end),
        slot.status.label(),
        slot.id
    )
}

fn appointment_line(appointment: &Appointment) -> String {
    let when = appointment.slot.as_ref().map_or_else(|| "-".to_owned(), |slot| format_date_time(&slot.start));
    let doctor = appointment.doctor.as_ref().map_or("-", |doctor| doctor.name.as_str());
    format!("{when}  {:<10} {doctor}  {}", appointment.status.label(), appointment.id)
}

fn payment_line(payment: &Payment) -> String {
    format!(
        "{:>14}  {:<18} {:<9} {}",
        format_currency(payment.amount),
        payment_method_label(payment.method),
        payment.status.label(),
        payment.id
    )
}

fn print_kpis(kpis: &DashboardKpis, role: Option<Role>) {
    println!("Consultas no mês: {}", kpis.appointments_this_month);
    println!("Faturamento no mês: {}", format_currency(kpis.revenue_this_month));
    println!("Taxa de ocupação: {}", format_percent(kpis.occupancy_rate));
    if role == Some(Role::Admin) {
        println!("Usuários ativos: {}", kpis.active_users);
    }
    for visit in &kpis.upcoming {
        let who = visit.patient_name.as_deref().or(visit.doctor_name.as_deref()).unwrap_or("-");
        println!("  {}  {who}", format_date_time(&visit.starts_at));
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
