use tracing::{info, warn};

use crate::{
    accounts::{
        dto::{
            DriverRegisterRequest, LoginData, LoginRequest, ResendOtpRequest, RiderRegisterRequest,
            VerifyOtpRequest,
        },
        repo::AccountRepo,
        repo_types::{Account, AccountState, Admin, Driver, Filter, Inserted, Rider},
    },
    auth::{
        jwt::{AuthUser, JwtKeys},
        otp::send_otp,
        password::{hash_password, verify_password},
    },
    error::{AppError, AppResult},
    mail::Mailer,
    validation::{parse_id, Checks},
};

pub const WRONG_CREDENTIALS: &str = "Email or Password wrong.";
pub const NOT_CONFIRMED: &str = "Account is not confirmed. Please confirm your account.";
pub const NOT_ACTIVE: &str = "Account is not active. Please contact admin.";
pub const EMAIL_NOT_FOUND: &str = "Specified email not found.";
pub const ALREADY_CONFIRMED: &str = "Account already confirmed.";
pub const OTP_MISMATCH: &str = "Otp does not match";
pub const EMAIL_TAKEN: &str = "E-mail already in use";
pub const LICENSE_TAKEN: &str = "Driver already exists with this License Number.";
pub const NOT_ALLOWED: &str = "You are not allowed to use this information";

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_email(checks: &mut Checks, email: &str) {
    checks
        .required("email", email, "Email must be specified.")
        .email("email", email, "Email must be a valid email address.");
}

fn check_names(checks: &mut Checks, first_name: &str, last_name: &str) {
    checks
        .required("firstName", first_name, "First name must be specified.")
        .alphanumeric("firstName", first_name, "First name has non-alphanumeric characters.");
    checks
        .required("lastName", last_name, "Last name must be specified.")
        .alphanumeric("lastName", last_name, "Last name has non-alphanumeric characters.");
}

fn check_password(checks: &mut Checks, password: &str) {
    checks.min_len("password", password, 6, "Password must be 6 characters or greater.");
}

fn duplicate_message(field: &str) -> &'static str {
    match field {
        "licenseNumber" => LICENSE_TAKEN,
        _ => EMAIL_TAKEN,
    }
}

/// Everything registration needs once the per-role fields are validated.
struct Registration<'a> {
    checks: Checks,
    email: String,
    password: &'a str,
    license_number: Option<&'a str>,
}

/// Uniqueness checks, hashing, code delivery and insert. The account is only
/// stored after the confirmation mail was accepted.
async fn register<A, F>(
    repo: &dyn AccountRepo<A>,
    mailer: &dyn Mailer,
    from: &str,
    reg: Registration<'_>,
    build: F,
) -> AppResult<A>
where
    A: Account,
    F: FnOnce(AccountState) -> A + Send,
{
    let Registration {
        mut checks,
        email,
        password,
        license_number,
    } = reg;

    if !email.is_empty() && repo.find_one(Filter::Email(&email)).await?.is_some() {
        checks.push("email", EMAIL_TAKEN);
    }
    if let Some(license) = license_number.filter(|l| !l.is_empty()) {
        if repo.find_one(Filter::LicenseNumber(license)).await?.is_some() {
            checks.push("licenseNumber", LICENSE_TAKEN);
        }
    }
    if !checks.is_empty() {
        warn!(role = ?A::ROLE, "registration rejected");
    }
    checks.finish()?;

    let hash = hash_password(password)?;
    let otp = send_otp(mailer, from, &email).await?;
    let account = build(AccountState::unconfirmed(email, hash, otp));

    match repo.insert(&account).await? {
        Inserted::Ok => {
            info!(role = ?A::ROLE, user_id = %account.state().id, email = %account.state().email, "account registered");
            Ok(account)
        }
        Inserted::Duplicate(field) => Err(AppError::invalid(field, duplicate_message(field))),
    }
}

pub async fn register_rider(
    repo: &dyn AccountRepo<Rider>,
    mailer: &dyn Mailer,
    from: &str,
    req: RiderRegisterRequest,
) -> AppResult<Rider> {
    let email = normalize_email(&req.email);
    let first_name = req.first_name.trim().to_string();
    let last_name = req.last_name.trim().to_string();
    let phone_number = Some(req.phone_number.trim().to_string()).filter(|p| !p.is_empty());

    let mut checks = Checks::new();
    check_names(&mut checks, &first_name, &last_name);
    check_email(&mut checks, &email);
    check_password(&mut checks, &req.password);

    let reg = Registration {
        checks,
        email,
        password: &req.password,
        license_number: None,
    };
    register(repo, mailer, from, reg, move |state| Rider {
        state,
        first_name,
        last_name,
        phone_number,
    })
    .await
}

pub async fn register_driver(
    repo: &dyn AccountRepo<Driver>,
    mailer: &dyn Mailer,
    from: &str,
    req: DriverRegisterRequest,
) -> AppResult<Driver> {
    let email = normalize_email(&req.email);
    let first_name = req.first_name.trim().to_string();
    let last_name = req.last_name.trim().to_string();
    let license_number = req.license_number.trim().to_string();

    let mut checks = Checks::new();
    check_names(&mut checks, &first_name, &last_name);
    checks.required("age", &req.age, "Age must be specified.");
    let age = checks.positive_int("age", &req.age, "Age must be a positive number.");
    checks.required("phoneNumber", &req.phone_number, "Phone Number must be specified.");
    checks.required("carNumber", &req.car_number, "Car Number must be specified.");
    checks.required("carModel", &req.car_model, "Car Model must be specified.");
    checks.required("carType", &req.car_type, "Car Type must be specified.");
    checks.required("companyMade", &req.company_made, "Company Made must be specified.");
    check_email(&mut checks, &email);
    checks.required("licenseNumber", &license_number, "License Number must be specified.");
    check_password(&mut checks, &req.password);

    let reg = Registration {
        checks,
        email,
        password: &req.password,
        license_number: Some(&license_number),
    };
    let phone_number = req.phone_number.trim().to_string();
    let car_number = req.car_number.trim().to_string();
    let car_model = req.car_model.trim().to_string();
    let car_type = req.car_type.trim().to_string();
    let company_made = req.company_made.trim().to_string();
    let license = license_number.clone();
    register(repo, mailer, from, reg, move |state| Driver {
        state,
        first_name,
        last_name,
        // Only reached when validation passed, so the age parsed.
        age: age.unwrap_or_default(),
        phone_number,
        license_number: license,
        car_number,
        car_model,
        car_type,
        company_made,
    })
    .await
}

pub async fn login<A: Account>(
    repo: &dyn AccountRepo<A>,
    keys: &JwtKeys,
    req: LoginRequest,
) -> AppResult<LoginData<A::Profile>> {
    let email = normalize_email(&req.email);
    let mut checks = Checks::new();
    check_email(&mut checks, &email);
    checks.required("password", &req.password, "Password must be specified.");
    checks.finish()?;

    let Some(account) = repo.find_one(Filter::Email(&email)).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::unauthorized(WRONG_CREDENTIALS));
    };
    let state = account.state();

    if !verify_password(&req.password, &state.password_hash)? {
        warn!(email = %email, user_id = %state.id, "login invalid password");
        return Err(AppError::unauthorized(WRONG_CREDENTIALS));
    }
    if !state.is_confirmed {
        return Err(AppError::unauthorized(NOT_CONFIRMED));
    }
    if !state.status {
        return Err(AppError::unauthorized(NOT_ACTIVE));
    }

    let profile = account.profile();
    let token = keys.sign(state.id, A::ROLE, &profile)?;
    info!(role = ?A::ROLE, user_id = %state.id, "logged in");
    Ok(LoginData { profile, token })
}

pub async fn verify_otp<A: Account>(repo: &dyn AccountRepo<A>, req: VerifyOtpRequest) -> AppResult<()> {
    let email = normalize_email(&req.email);
    let otp = req.otp.trim();
    let mut checks = Checks::new();
    check_email(&mut checks, &email);
    checks.required("otp", otp, "OTP must be specified.");
    checks.finish()?;

    let Some(account) = repo.find_one(Filter::Email(&email)).await? else {
        return Err(AppError::unauthorized(EMAIL_NOT_FOUND));
    };
    if account.state().is_confirmed {
        return Err(AppError::unauthorized(ALREADY_CONFIRMED));
    }
    if !repo.confirm(account.state().id, otp).await? {
        warn!(user_id = %account.state().id, "otp mismatch");
        return Err(AppError::unauthorized(OTP_MISMATCH));
    }
    info!(role = ?A::ROLE, user_id = %account.state().id, "account confirmed");
    Ok(())
}

pub async fn resend_otp<A: Account>(
    repo: &dyn AccountRepo<A>,
    mailer: &dyn Mailer,
    from: &str,
    req: ResendOtpRequest,
) -> AppResult<()> {
    let email = normalize_email(&req.email);
    let mut checks = Checks::new();
    check_email(&mut checks, &email);
    checks.finish()?;

    let Some(account) = repo.find_one(Filter::Email(&email)).await? else {
        return Err(AppError::unauthorized(EMAIL_NOT_FOUND));
    };
    if account.state().is_confirmed {
        return Err(AppError::unauthorized(ALREADY_CONFIRMED));
    }
    let otp = send_otp(mailer, from, &email).await?;
    repo.reset_otp(account.state().id, &otp).await?;
    Ok(())
}

pub async fn list<A: Account>(repo: &dyn AccountRepo<A>) -> AppResult<Vec<A::Profile>> {
    let accounts = repo.list().await?;
    Ok(accounts.iter().map(A::profile).collect())
}

/// Malformed ids behave like unknown ones.
pub async fn detail<A: Account>(repo: &dyn AccountRepo<A>, raw_id: Option<&str>) -> AppResult<Option<A::Profile>> {
    let Some(id) = raw_id.and_then(parse_id) else {
        return Ok(None);
    };
    Ok(repo.find_one(Filter::Id(id)).await?.map(|a| a.profile()))
}

/// Re-reads the account behind a token and requires it to still be a
/// confirmed, active account of type `A`.
pub async fn current<A: Account>(repo: &dyn AccountRepo<A>, user: AuthUser, denied: &str) -> AppResult<A> {
    if user.role != A::ROLE {
        return Err(AppError::unauthorized(denied));
    }
    match repo.find_one(Filter::Id(user.id)).await? {
        Some(a) if a.state().is_confirmed && a.state().status => Ok(a),
        _ => Err(AppError::unauthorized(denied)),
    }
}

pub async fn require_admin(repo: &dyn AccountRepo<Admin>, user: AuthUser) -> AppResult<Admin> {
    current(repo, user, NOT_ALLOWED).await
}
