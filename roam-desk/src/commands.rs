use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::NaiveDate;

use roam_client::{Config, StorefrontClient};
use roam_core::api::{
    AdminApi, AuthApi, BookingApi, CatalogApi, Credentials, ReviewApi, ReviewDraft,
};
use roam_flow::view::{render, View};
use roam_flow::{BookingFlow, BridgeConfig, CustomerProfile, FlowStage, PaymentBridge};
use roam_shared::models::user::Role;
use roam_shared::money::format_inr;
use roam_shared::Booking;

use crate::checkout::TerminalCheckout;
use crate::cli::{AdminCommand, BookingsCommand, Cli, Command, ReviewsCommand, ToursCommand};
use crate::term::Prompter;

pub async fn run(cli: Cli, config: Config, client: Arc<StorefrontClient>) -> anyhow::Result<()> {
    match cli.command {
        Command::Tours { command } => match command {
            ToursCommand::List => list_tours(&client).await,
            ToursCommand::Show { id } => show_tour(&client, &id).await,
        },
        Command::Book {
            package_id,
            travelers,
            date,
        } => book(client, &config, &package_id, travelers, date).await,
        Command::Bookings { command } => match command {
            BookingsCommand::List => list_bookings(&client).await,
            BookingsCommand::Show { id } => show_booking(&client, &id).await,
            BookingsCommand::Cancel { id } => cancel_booking(&client, &id).await,
        },
        Command::Reviews { command } => match command {
            ReviewsCommand::List { tour_id } => list_reviews(&client, &tour_id).await,
            ReviewsCommand::Add {
                tour_id,
                rating,
                comment,
            } => add_review(&client, &tour_id, rating, comment).await,
        },
        Command::Login { email } => login(&client, email).await,
        Command::Admin { command } => match command {
            AdminCommand::Bookings => admin_bookings(&client).await,
            AdminCommand::SetStatus { booking_id, status } => {
                admin_set_status(&client, &booking_id, status).await
            }
            AdminCommand::Activity { limit } => admin_activity(&client, limit).await,
            AdminCommand::Users => admin_users(&client).await,
        },
    }
}

// ---------------------------------------------------------------------------
// Booking flow
// ---------------------------------------------------------------------------

async fn book(
    client: Arc<StorefrontClient>,
    config: &Config,
    package_id: &str,
    travelers: u32,
    date: Option<NaiveDate>,
) -> anyhow::Result<()> {
    if !client.has_session() {
        bail!("you need to be logged in to book; run `roam-desk login <email>` first");
    }

    let package = match client.tour(package_id).await {
        Ok(package) => package,
        Err(err) => {
            print_view(&View::unavailable(
                err.display_message("Package not found or error loading details."),
            ));
            return Ok(());
        }
    };
    let me = client
        .current_user()
        .await
        .context("could not load your profile")?;

    let customer = CustomerProfile {
        name: me.name.clone(),
        email: me.email.clone(),
    };
    let mut flow = BookingFlow::new(
        client.clone(),
        package,
        customer,
        config.rules.min_lead_days,
    );
    flow.set_num_travelers(travelers);
    if let Some(date) = date {
        flow.set_travel_date(date);
    }

    let prompter = Arc::new(Prompter::new());

    print_view(&render(&flow));
    if flow.travel_date().is_none() {
        prompt_travel_date(&prompter, &mut flow).await?;
    }

    // Form stage: submit until the backend accepts the draft or the
    // operator gives up.
    loop {
        flow.submit().await?;
        if matches!(flow.stage(), FlowStage::AwaitingPayment(_)) {
            break;
        }
        if let Some(err) = flow.error() {
            println!("! {err}");
        }
        if !prompter.confirm("Edit the travel date and try again?").await? {
            return Ok(());
        }
        prompt_travel_date(&prompter, &mut flow).await?;
    }

    // Payment stage: the order stays collectable across attempts.
    let gateway = Arc::new(TerminalCheckout::new(prompter.clone()));
    let bridge_config = BridgeConfig {
        storefront_name: config.storefront.name.clone(),
        theme_color: config.storefront.theme_color.clone(),
    };
    let mut bridge = PaymentBridge::mount(client.clone(), gateway, bridge_config).await?;

    print_view(&render(&flow));
    loop {
        flow.take_payment(&mut bridge).await?;
        match flow.stage() {
            FlowStage::Confirmed(_) => {
                print_view(&render(&flow));
                return Ok(());
            }
            FlowStage::AwaitingPayment(_) => {
                if let Some(err) = flow.error() {
                    println!("! {err}");
                }
                if !prompter.confirm("Try the payment again?").await? {
                    println!(
                        "The booking stays pending; its order can still be paid on a later attempt."
                    );
                    return Ok(());
                }
            }
            FlowStage::Form => return Ok(()),
        }
    }
}

async fn prompt_travel_date(
    prompter: &Prompter,
    flow: &mut BookingFlow,
) -> anyhow::Result<()> {
    let line = prompter
        .ask(&format!(
            "Preferred travel date (YYYY-MM-DD, earliest {}): ",
            flow.min_travel_date()
        ))
        .await?;
    if line.is_empty() {
        return Ok(());
    }
    match line.parse() {
        Ok(date) => flow.set_travel_date(date),
        Err(_) => println!("Not a date: {line}"),
    }
    Ok(())
}

fn print_view(view: &View) {
    match view {
        View::Form(form) => {
            println!();
            println!("{} — {}", form.package_name, form.destination);
            println!("Duration:         {} days", form.duration_days);
            println!("Price per person: {}", form.price_per_person);
            println!(
                "Total ({} traveler{}): {}",
                form.num_travelers,
                if form.num_travelers > 1 { "s" } else { "" },
                form.total
            );
            if let Some(err) = &form.error {
                println!("! {err}");
            }
        }
        View::Payment(payment) => {
            println!();
            println!("Complete your payment to confirm the booking.");
            println!("Package:      {}", payment.package_name);
            println!("Travel date:  {}", payment.travel_date);
            println!("Travelers:    {}", payment.num_travelers);
            println!("Total amount: {}", payment.total);
            if let Some(err) = &payment.error {
                println!("! {err}");
            }
        }
        View::Confirmed(confirmation) => {
            println!();
            println!("Booking confirmed!");
            println!(
                "Thank you, {}, for booking {}.",
                confirmation.customer_name, confirmation.package_name
            );
            println!("Travel date: {}", confirmation.travel_date);
            println!("Travelers:   {}", confirmation.num_travelers);
            println!("Total paid:  {}", confirmation.total_paid);
            println!("See it any time with `roam-desk bookings list`.");
        }
        View::Unavailable { message } => {
            println!("! {message}");
            println!("Browse other tours with `roam-desk tours list`.");
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

async fn list_tours(client: &StorefrontClient) -> anyhow::Result<()> {
    let tours = client.list_tours().await?;
    for tour in &tours {
        println!(
            "{}  {}  {} days  {}  {}",
            tour.id,
            tour.destination,
            tour.duration,
            format_inr(tour.price),
            tour.name
        );
    }
    println!("{} tour(s)", tours.len());
    Ok(())
}

async fn show_tour(client: &StorefrontClient, id: &str) -> anyhow::Result<()> {
    let tour = client.tour(id).await?;
    println!("{} — {}", tour.name, tour.destination);
    println!("Duration: {} days", tour.duration);
    println!("Price:    {} per person", format_inr(tour.price));
    println!("Rating:   {:.1}/5", tour.rating);
    if let Some(best) = &tour.best_time_to_visit {
        println!("Best time to visit: {best}");
    }
    if !tour.description.is_empty() {
        println!();
        println!("{}", tour.description);
    }
    if !tour.whats_included.is_empty() {
        println!();
        println!("Included: {}", tour.whats_included.join(", "));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

fn print_booking_line(booking: &Booking) {
    println!(
        "{}  {:9}  {}  {}  {} traveler(s)  {}",
        booking.id,
        booking.status.as_str(),
        booking.travel_date.date_naive(),
        format_inr(booking.total_price),
        booking.num_travelers,
        booking.package_name
    );
}

async fn list_bookings(client: &StorefrontClient) -> anyhow::Result<()> {
    let mut bookings = client.my_bookings().await?;
    bookings.sort_by(|a, b| b.booking_date.cmp(&a.booking_date));
    for booking in &bookings {
        print_booking_line(booking);
    }
    println!("{} booking(s)", bookings.len());
    Ok(())
}

async fn show_booking(client: &StorefrontClient, id: &str) -> anyhow::Result<()> {
    let booking = client.booking(id).await?;
    println!("Booking {}", booking.id);
    println!("Package:     {}", booking.package_name);
    println!("Status:      {}", booking.status);
    println!("Travel date: {}", booking.travel_date.date_naive());
    println!("Travelers:   {}", booking.num_travelers);
    println!("Total:       {}", format_inr(booking.total_price));
    Ok(())
}

async fn cancel_booking(client: &StorefrontClient, id: &str) -> anyhow::Result<()> {
    let prompter = Prompter::new();
    if !prompter
        .confirm("Are you sure you want to cancel this booking?")
        .await?
    {
        return Ok(());
    }
    client.cancel_booking(id).await?;
    println!("Booking {id} cancelled.");
    Ok(())
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

async fn list_reviews(client: &StorefrontClient, tour_id: &str) -> anyhow::Result<()> {
    let reviews = client.reviews_for_tour(tour_id).await?;
    for review in &reviews {
        println!("{}/5  {}  {}", review.rating, review.user_name, review.comment);
    }
    println!("{} review(s)", reviews.len());
    Ok(())
}

async fn add_review(
    client: &StorefrontClient,
    tour_id: &str,
    rating: u8,
    comment: String,
) -> anyhow::Result<()> {
    if !(1..=5).contains(&rating) {
        bail!("rating must be between 1 and 5");
    }
    let review = client
        .submit_review(&ReviewDraft {
            package_id: tour_id.to_string(),
            rating,
            comment,
        })
        .await?;
    println!("Review {} saved.", review.id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

async fn login(client: &StorefrontClient, email: String) -> anyhow::Result<()> {
    let prompter = Prompter::new();
    let password = prompter.ask("Password: ").await?;
    let session = client
        .login(&Credentials {
            email,
            password: password.into(),
        })
        .await?;

    let role = match session.user.role {
        Role::Admin => "admin",
        Role::User => "user",
    };
    println!("Logged in as {} ({role})", session.user.name);
    println!("export ROAM_TOKEN={}", session.token);
    Ok(())
}

// ---------------------------------------------------------------------------
// Back office
// ---------------------------------------------------------------------------

async fn admin_bookings(client: &StorefrontClient) -> anyhow::Result<()> {
    let mut bookings = client.all_bookings().await?;
    bookings.sort_by(|a, b| b.booking_date.cmp(&a.booking_date));
    for booking in &bookings {
        print_booking_line(booking);
    }
    println!("{} booking(s)", bookings.len());
    Ok(())
}

async fn admin_set_status(
    client: &StorefrontClient,
    booking_id: &str,
    status: roam_shared::BookingStatus,
) -> anyhow::Result<()> {
    let booking = client.update_booking_status(booking_id, status).await?;
    println!("Booking {} is now {}.", booking.id, booking.status);
    Ok(())
}

async fn admin_activity(client: &StorefrontClient, limit: u32) -> anyhow::Result<()> {
    let entries = client.recent_booking_activity(limit).await?;
    for entry in &entries {
        println!("{}  {}  {}", entry.timestamp, entry.action, entry.details);
    }
    Ok(())
}

async fn admin_users(client: &StorefrontClient) -> anyhow::Result<()> {
    let users = client.list_users().await?;
    for user in &users {
        let role = match user.role {
            Role::Admin => "admin",
            Role::User => "user",
        };
        let active = match user.is_active {
            Some(false) => "inactive",
            _ => "active",
        };
        println!("{}  {:8}  {:8}  {}", user.id, role, active, user.name);
    }
    println!("{} user(s)", users.len());
    Ok(())
}
