//! Back-office CLI for the Yooga Pay payment API.

use std::io::{self, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use yoopay_rs::auth::AuthBlockingClient;
use yoopay_rs::back_office::{BackOfficeBlocking, MerchantScreen};
use yoopay_rs::config::{ApiConfig, AuthConfig};
use yoopay_rs::editor::BankField;
use yoopay_rs::error::YooPayError;
use yoopay_rs::fees::FeeConfigurationManager;
use yoopay_rs::models::{
    FeeType, MerchantProfile, PixKeyType, PixValidationRequest, StaffUser, ValidationRequestId,
    WeekendPayoutStatus,
};
use yoopay_rs::roles::{Screen, navigation_for};
use yoopay_rs::session::{FileStore, SessionRepository};

/// Environment variable holding the login password.
const PASSWORD_ENV: &str = "YOOPAY_PASSWORD";

/// Yooga Pay back-office: merchant lookup, bank details, PIX fees and
/// PIX validation review.
#[derive(Debug, Parser)]
#[command(name = "yoopay", version, about)]
struct Cli {
    /// Override the session directory (default: XDG data dir).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and store the session.
    Login {
        /// Login e-mail.
        #[arg(long)]
        email: String,
        /// Password (defaults to the YOOPAY_PASSWORD environment variable).
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and remove the stored session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// List the screens available to the signed-in user.
    Menu,
    /// Look a merchant up and show its registration data.
    Lookup {
        /// Merchant identifier (marketplace id, origin id or document).
        id: String,
    },
    /// Change a merchant's bank details.
    SaveBank(SaveBankArgs),
    /// Enable or disable the PIX fee of a merchant.
    #[command(subcommand)]
    Fee(FeeCommand),
    /// List PIX validation requests waiting for review.
    Pending,
    /// Approve a PIX validation request.
    Approve {
        /// Validation request id.
        id: i64,
    },
    /// Reject a PIX validation request.
    Reject {
        /// Validation request id.
        id: i64,
    },
}

/// Arguments for the `save-bank` subcommand. Omitted fields keep their
/// current value.
#[derive(Debug, Args)]
struct SaveBankArgs {
    /// Merchant identifier.
    id: String,
    /// Bank display name, or "Outro (não listado)".
    #[arg(long)]
    bank: Option<String>,
    /// Branch number.
    #[arg(long)]
    agency: Option<String>,
    /// Account number.
    #[arg(long)]
    account: Option<String>,
    /// Account check digit.
    #[arg(long)]
    account_digit: Option<String>,
    /// PIX key.
    #[arg(long)]
    pix_key: Option<String>,
    /// PIX key type (cpf, cnpj, email, phone, random).
    #[arg(long, value_parser = parse_pix_key_type)]
    pix_key_type: Option<PixKeyType>,
    /// Account holder name.
    #[arg(long)]
    holder_name: Option<String>,
    /// Account holder CPF/CNPJ.
    #[arg(long)]
    holder_document: Option<String>,
}

/// `fee` subcommands.
#[derive(Debug, Subcommand)]
enum FeeCommand {
    /// Enable PIX with the given fee.
    Enable {
        /// Merchant identifier.
        id: String,
        /// Fee value (`2.5` or `2,5`).
        #[arg(long)]
        value: String,
        /// Fee type (percentage or fixed).
        #[arg(long, default_value = "percentage", value_parser = parse_fee_type)]
        fee_type: FeeType,
    },
    /// Disable PIX.
    Disable {
        /// Merchant identifier.
        id: String,
    },
}

/// Parses a fee type for clap.
fn parse_fee_type(raw: &str) -> Result<FeeType, String> {
    raw.parse().map_err(|err: YooPayError| err.to_string())
}

/// Parses a PIX key type for clap.
fn parse_pix_key_type(raw: &str) -> Result<PixKeyType, String> {
    raw.parse().map_err(|err: YooPayError| err.to_string())
}

/// Creates a spinner with the given message.
fn make_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(core::time::Duration::from_millis(80));
    spinner
}

/// Prints the staff-facing message of `err` and logs the details.
fn report(err: &YooPayError) -> io::Result<ExitCode> {
    tracing::debug!(error = %err, "command failed");
    writeln!(
        io::stderr().lock(),
        "{} {}",
        "erro:".red().bold(),
        err.user_message()
    )?;
    Ok(ExitCode::FAILURE)
}

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let sessions = match create_sessions(cli.data_dir) {
        Ok(sessions) => sessions,
        Err(err) => return report(&err),
    };

    dispatch(&sessions, cli.command)
}

/// Opens the session store, using `data_dir` if provided or the default
/// XDG data directory otherwise.
fn create_sessions(
    data_dir: Option<PathBuf>,
) -> yoopay_rs::error::Result<SessionRepository<FileStore>> {
    let dir = match data_dir {
        Some(custom) => custom,
        None => FileStore::default_dir()?,
    };
    Ok(SessionRepository::new(FileStore::new(dir)?))
}

/// Dispatches to the appropriate subcommand handler.
fn dispatch(sessions: &SessionRepository<FileStore>, command: Command) -> io::Result<ExitCode> {
    match command {
        Command::Login { email, password } => cmd_login(sessions, &email, password),
        Command::Logout => cmd_logout(sessions),
        Command::Whoami => with_screen(sessions, Screen::Dashboard, cmd_whoami),
        Command::Menu => with_screen(sessions, Screen::Dashboard, cmd_menu),
        Command::Lookup { id } => with_screen(sessions, Screen::Cadastro, |_user| {
            with_back_office(|office| cmd_lookup(office, &id))
        }),
        Command::SaveBank(args) => with_screen(sessions, Screen::Cadastro, |_user| {
            with_back_office(|office| cmd_save_bank(office, &args))
        }),
        Command::Fee(fee) => with_screen(sessions, Screen::Cadastro, |_user| {
            with_back_office(|office| cmd_fee(office, fee))
        }),
        Command::Pending => with_screen(sessions, Screen::Pendentes, |_user| {
            with_back_office(cmd_pending)
        }),
        Command::Approve { id } => with_screen(sessions, Screen::Pendentes, |_user| {
            with_back_office(|office| cmd_review(office, ValidationRequestId::new(id), true))
        }),
        Command::Reject { id } => with_screen(sessions, Screen::Pendentes, |_user| {
            with_back_office(|office| cmd_review(office, ValidationRequestId::new(id), false))
        }),
    }
}

/// Runs `op` for the signed-in user if their role may open `screen`.
fn with_screen<F>(
    sessions: &SessionRepository<FileStore>,
    screen: Screen,
    op: F,
) -> io::Result<ExitCode>
where
    F: FnOnce(&StaffUser) -> io::Result<ExitCode>,
{
    let user = match sessions.load() {
        Ok(Some(user)) => user,
        Ok(None) => {
            writeln!(
                io::stderr().lock(),
                "{} nenhuma sessão ativa; use {}",
                "erro:".red().bold(),
                "yoopay login".bold()
            )?;
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return report(&err),
    };
    if !user.role.can_access(screen) {
        tracing::debug!(role = user.role.as_str(), "access denied");
        writeln!(
            io::stderr().lock(),
            "{} o perfil {} não tem acesso a esta tela",
            "erro:".red().bold(),
            user.role.label().bold()
        )?;
        return Ok(ExitCode::FAILURE);
    }
    op(&user)
}

/// Builds the back-office client from the environment and runs `op`.
fn with_back_office<F>(op: F) -> io::Result<ExitCode>
where
    F: FnOnce(&BackOfficeBlocking) -> io::Result<ExitCode>,
{
    let built = ApiConfig::from_env().and_then(|config| BackOfficeBlocking::from_config(&config));
    let office = match built {
        Ok(office) => office,
        Err(err) => return report(&err),
    };
    op(&office)
}

/// Executes the `login` subcommand.
fn cmd_login(
    sessions: &SessionRepository<FileStore>,
    email: &str,
    password: Option<String>,
) -> io::Result<ExitCode> {
    let secret = password
        .or_else(|| std::env::var(PASSWORD_ENV).ok())
        .unwrap_or_default();
    let spinner = make_spinner("Entrando...");
    let result = AuthConfig::from_env()
        .and_then(|config| AuthBlockingClient::new(&config))
        .and_then(|auth| auth.sign_in(email, &secret))
        .and_then(|session| {
            let user = StaffUser::from_auth_user(&session.user)?;
            sessions.save(&user)?;
            sessions.save_access_token(&session.access_token)?;
            Ok(user)
        });
    spinner.finish_and_clear();
    match result {
        Ok(user) => {
            writeln!(
                io::stdout().lock(),
                "{} {} ({})",
                "Bem-vindo,".green().bold(),
                user.name,
                user.role.label()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report(&err),
    }
}

/// Executes the `logout` subcommand.
fn cmd_logout(sessions: &SessionRepository<FileStore>) -> io::Result<ExitCode> {
    if let Ok(Some(token)) = sessions.access_token() {
        let revoked = AuthConfig::from_env()
            .and_then(|config| AuthBlockingClient::new(&config))
            .and_then(|auth| auth.sign_out(&token));
        if let Err(err) = revoked {
            tracing::warn!(error = %err, "could not revoke the remote session");
        }
    }
    if let Err(err) = sessions.clear() {
        return report(&err);
    }
    writeln!(io::stdout().lock(), "{}", "Sessão encerrada.".green())?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `whoami` subcommand.
fn cmd_whoami(user: &StaffUser) -> io::Result<ExitCode> {
    let mut out = io::stdout().lock();
    writeln!(out, "{} <{}>", user.name.bold(), user.email)?;
    writeln!(out, "Perfil: {}", user.role.label().cyan())?;
    if let Some(signed_in_at) = user.signed_in_at {
        writeln!(out, "Desde: {}", signed_in_at.format("%Y-%m-%d %H:%M UTC"))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `menu` subcommand.
fn cmd_menu(user: &StaffUser) -> io::Result<ExitCode> {
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Tela").fg(Color::Cyan),
        Cell::new("Caminho").fg(Color::Cyan),
    ]);
    for item in navigation_for(user.role) {
        _ = table.add_row(vec![Cell::new(item.title), Cell::new(item.path)]);
    }
    writeln!(io::stdout().lock(), "{table}")?;
    Ok(ExitCode::SUCCESS)
}

/// Looks `id` up behind the "Buscando..." spinner.
fn open_merchant(
    office: &BackOfficeBlocking,
    id: &str,
) -> yoopay_rs::error::Result<MerchantScreen> {
    let spinner = make_spinner("Buscando...");
    let result = office.open_merchant(id);
    spinner.finish_and_clear();
    result
}

/// Executes the `lookup` subcommand.
fn cmd_lookup(office: &BackOfficeBlocking, id: &str) -> io::Result<ExitCode> {
    match open_merchant(office, id) {
        Ok(screen) => {
            print_profile(&screen.profile, screen.weekend_payout)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report(&err),
    }
}

/// Applies the given options to the editor draft.
fn apply_bank_args(
    screen: &mut MerchantScreen,
    args: &SaveBankArgs,
) -> yoopay_rs::error::Result<()> {
    let editor = &mut screen.bank_editor;
    if let Some(bank) = args.bank.as_deref() {
        editor.select_bank(bank)?;
    }
    let fields = [
        (BankField::Agency, &args.agency),
        (BankField::Account, &args.account),
        (BankField::AccountDigit, &args.account_digit),
        (BankField::PixKey, &args.pix_key),
        (BankField::HolderName, &args.holder_name),
        (BankField::HolderDocument, &args.holder_document),
    ];
    for (field, value) in fields {
        if let Some(text) = value.as_deref() {
            editor.set(field, text)?;
        }
    }
    if let Some(key_type) = args.pix_key_type {
        editor.set_pix_key_type(Some(key_type));
    }
    Ok(())
}

/// Executes the `save-bank` subcommand.
fn cmd_save_bank(office: &BackOfficeBlocking, args: &SaveBankArgs) -> io::Result<ExitCode> {
    let mut screen = match open_merchant(office, &args.id) {
        Ok(screen) => screen,
        Err(err) => return report(&err),
    };
    if let Err(err) = apply_bank_args(&mut screen, args) {
        return report(&err);
    }
    if !screen.bank_editor.is_dirty() {
        writeln!(io::stdout().lock(), "{}", "Nenhuma alteração para salvar.".dimmed())?;
        return Ok(ExitCode::SUCCESS);
    }
    let spinner = make_spinner("Salvando...");
    let result = office.save_bank_details(&mut screen.bank_editor);
    spinner.finish_and_clear();
    match result {
        Ok(profile) => {
            writeln!(
                io::stdout().lock(),
                "{}",
                "Informações salvas com sucesso!".green().bold()
            )?;
            print_profile(&profile, screen.weekend_payout)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report(&err),
    }
}

/// Executes the `fee` subcommands.
fn cmd_fee(office: &BackOfficeBlocking, command: FeeCommand) -> io::Result<ExitCode> {
    let (id, change) = match command {
        FeeCommand::Enable {
            id,
            value,
            fee_type,
        } => (id, Some((value, fee_type))),
        FeeCommand::Disable { id } => (id, None),
    };
    let mut screen = match open_merchant(office, &id) {
        Ok(screen) => screen,
        Err(err) => return report(&err),
    };
    let result = match change {
        Some((value, fee_type)) => enable_fee(office, &mut screen.fees, &value, fee_type),
        None => office.disable_fee(&mut screen.fees),
    };
    if let Err(err) = result {
        return report(&err);
    }
    let fee = screen.fees.current();
    let status = match (fee.enabled, fee.preview()) {
        (true, Some(preview)) => preview,
        (true, None) | (false, _) => "PIX desativado".to_owned(),
    };
    writeln!(
        io::stdout().lock(),
        "{} {status}",
        "Taxa atualizada:".green().bold()
    )?;
    Ok(ExitCode::SUCCESS)
}

/// Stages `value` and `fee_type` and enables PIX with them.
fn enable_fee(
    office: &BackOfficeBlocking,
    fees: &mut FeeConfigurationManager,
    value: &str,
    fee_type: FeeType,
) -> yoopay_rs::error::Result<()> {
    fees.set_value(value)?;
    fees.set_fee_type(fee_type);
    office.enable_fee(fees)
}

/// Executes the `pending` subcommand.
fn cmd_pending(office: &BackOfficeBlocking) -> io::Result<ExitCode> {
    let spinner = make_spinner("Buscando...");
    let result = office.pending_pix_validations();
    spinner.finish_and_clear();
    match result {
        Ok(requests) => {
            print_validations(&requests)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report(&err),
    }
}

/// Executes the `approve` and `reject` subcommands.
fn cmd_review(
    office: &BackOfficeBlocking,
    id: ValidationRequestId,
    approve: bool,
) -> io::Result<ExitCode> {
    let result = if approve {
        office.approve_pix_validation(id)
    } else {
        office.reject_pix_validation(id)
    };
    match result {
        Ok(remaining) => {
            let verb = if approve { "aprovada" } else { "rejeitada" };
            writeln!(
                io::stdout().lock(),
                "{}",
                format!("Solicitação {id} {verb}.").green().bold()
            )?;
            print_validations(&remaining)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report(&err),
    }
}

/// Prints the registration data of a merchant.
fn print_profile(profile: &MerchantProfile, weekend_payout: WeekendPayoutStatus) -> io::Result<()> {
    let record = &profile.record;
    let bank = &profile.bank_details;
    let fee = &profile.fee;
    let payout_cell = match weekend_payout {
        WeekendPayoutStatus::Receives => Cell::new(weekend_payout).fg(Color::Green),
        WeekendPayoutStatus::DoesNotReceive => Cell::new(weekend_payout).fg(Color::Red),
        WeekendPayoutStatus::Unknown => Cell::new(weekend_payout).fg(Color::DarkGrey),
    };
    let fee_text = match (fee.enabled, fee.preview()) {
        (true, Some(preview)) => preview,
        (true, None) => "ativo".to_owned(),
        (false, _) => "PIX desativado".to_owned(),
    };
    let account = if bank.account_digit.is_empty() {
        bank.account.clone()
    } else {
        format!("{}-{}", bank.account, bank.account_digit)
    };

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    let rows = [
        ("ID", Cell::new(&record.id)),
        ("Nome", Cell::new(&record.name)),
        ("Documento", Cell::new(&record.document)),
        ("E-mail", Cell::new(&record.email)),
        ("Telefone", Cell::new(&record.phone)),
        ("Banco", Cell::new(bank.bank_name.as_deref().unwrap_or("-"))),
        ("Código", Cell::new(bank.bank_number.as_deref().unwrap_or("-"))),
        ("Agência", Cell::new(&bank.agency)),
        ("Conta", Cell::new(account)),
        ("Chave PIX", Cell::new(&bank.pix_key)),
        (
            "Tipo de chave",
            Cell::new(bank.pix_key_type.map_or("-", PixKeyType::label)),
        ),
        ("Beneficiário", Cell::new(&bank.holder_name)),
        ("Doc. beneficiário", Cell::new(&bank.holder_document)),
        ("Taxa PIX", Cell::new(fee_text)),
        ("Repasse fim de semana", payout_cell),
    ];
    for (label, value) in rows {
        _ = table.add_row(vec![Cell::new(label).fg(Color::Cyan), value]);
    }
    writeln!(io::stdout().lock(), "{table}")?;
    Ok(())
}

/// Prints pending PIX validation requests.
fn print_validations(requests: &[PixValidationRequest]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if requests.is_empty() {
        writeln!(out, "{}", "Nenhuma solicitação pendente.".dimmed())?;
        return Ok(());
    }
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("Origem").fg(Color::Cyan),
        Cell::new("Nome").fg(Color::Cyan),
        Cell::new("Documento").fg(Color::Cyan),
        Cell::new("Banco").fg(Color::Cyan),
        Cell::new("Troca de plano").fg(Color::Cyan),
        Cell::new("Criado em").fg(Color::Cyan),
    ]);
    for request in requests {
        let payload = request.parse_payload().unwrap_or_default();
        _ = table.add_row(vec![
            Cell::new(request.id),
            Cell::new(&request.origin_id),
            Cell::new(payload.trade_name),
            Cell::new(payload.document),
            Cell::new(payload.bank.bank_name),
            Cell::new(if request.switch_plan { "sim" } else { "não" }),
            Cell::new(request.created_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    writeln!(out, "{table}")?;
    Ok(())
}

/// Entry point.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            // stderr itself failed; nothing else to report to.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}
