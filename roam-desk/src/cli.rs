use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use roam_shared::BookingStatus;

#[derive(Debug, Parser)]
#[command(
    name = "roam-desk",
    version,
    about = "Terminal booking desk for the Roam travel storefront"
)]
pub struct Cli {
    /// Bearer token for the backend session
    #[arg(long, env = "ROAM_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse the tour catalog
    Tours {
        #[command(subcommand)]
        command: ToursCommand,
    },
    /// Book a tour and take payment through the hosted checkout
    Book {
        package_id: String,
        /// Party size
        #[arg(long, default_value_t = 1)]
        travelers: u32,
        /// Preferred travel date (YYYY-MM-DD); prompted for when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Your bookings
    Bookings {
        #[command(subcommand)]
        command: BookingsCommand,
    },
    /// Reviews for a tour
    Reviews {
        #[command(subcommand)]
        command: ReviewsCommand,
    },
    /// Log in and print the session token
    Login { email: String },
    /// Back-office operations (admin accounts only)
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ToursCommand {
    List,
    Show { id: String },
}

#[derive(Debug, Subcommand)]
pub enum BookingsCommand {
    List,
    Show { id: String },
    Cancel { id: String },
}

#[derive(Debug, Subcommand)]
pub enum ReviewsCommand {
    List {
        tour_id: String,
    },
    Add {
        tour_id: String,
        /// 1 to 5
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        comment: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// All bookings across customers
    Bookings,
    /// Force a booking status (pending, confirmed, cancelled, completed)
    SetStatus {
        booking_id: String,
        status: BookingStatus,
    },
    /// Recent booking activity log
    Activity {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// All registered users
    Users,
}
