pub mod refresh_fees;
