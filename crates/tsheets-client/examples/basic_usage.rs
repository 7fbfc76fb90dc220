//! Basic Usage Example
//!
//! Walks through a handful of calls against a real account:
//! - List users and jobcodes
//! - Create a timesheet, edit its notes, then delete it
//! - Run a project report for the current week
//!
//! Requires TSHEETS_ACCESS_TOKEN in the environment (or a `.env` file).

use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tsheets_client::{ObjectType, ReportType, TSheetsClient};
use tsheets_core::{ClientConfig, Error};

fn main() -> Result<(), Box<dyn std::error::Error>> {
  // Initialize logging
  tracing_subscriber::fmt::init();

  let config = ClientConfig::from_env()?;
  if config.access_token.is_none() {
    eprintln!("TSHEETS_ACCESS_TOKEN is not set.");
    eprintln!("Create an API application under Company Settings > Add-ons to get one.");
    return Ok(());
  }

  let client = TSheetsClient::new(config)?;
  println!("Talking to {}\n", client.base_url());

  let users = client.get(ObjectType::Users, ())?.into_value()?;
  println!("TSheets Users");
  println!("-------------");
  let users = first_level(&users, "users");
  for user in &users {
    println!(
      "User: {} {}",
      user["first_name"].as_str().unwrap_or(""),
      user["last_name"].as_str().unwrap_or("")
    );
  }

  let jobcodes = client.get(ObjectType::Jobcodes, ())?.into_value()?;
  let jobcodes = first_level(&jobcodes, "jobcodes");

  let (Some(user), Some(jobcode)) = (users.first(), jobcodes.first()) else {
    println!("\nNeed at least one user and one jobcode to continue");
    return Ok(());
  };

  // Create a regular timesheet for the last hour
  let end = Utc::now();
  let start = end - Duration::hours(1);
  let created = client.add(
    ObjectType::Timesheets,
    json!([{
      "user_id": user["id"],
      "jobcode_id": jobcode["id"],
      "type": "regular",
      "start": start.format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
      "end": end.format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
    }]),
  )?;

  let Some(timesheet_id) = created
    .as_value()
    .and_then(|v| v.pointer("/results/timesheets/1/id"))
    .and_then(Value::as_i64)
  else {
    println!("\nTimesheet was not created: {:?}", created.as_value());
    return Ok(());
  };
  println!("\nCreated timesheet {timesheet_id}");

  client.edit(ObjectType::Timesheets, json!([{"id": timesheet_id, "notes": "Edited from the example"}]))?;
  println!("Updated notes on timesheet {timesheet_id}");

  let report = client.get_report(
    ReportType::Project,
    json!({
      "start_date": (end - Duration::days(7)).format("%Y-%m-%d").to_string(),
      "end_date": end.format("%Y-%m-%d").to_string(),
    }),
  )?;
  if let Some(report) = report.as_value() {
    println!("\nProject report totals: {}", report["results"]["project_report"]["totals"]);
  }

  match client.delete(ObjectType::Timesheets, timesheet_id) {
    Ok(_) => println!("\nDeleted timesheet {timesheet_id}"),
    Err(Error::Request(failure)) => {
      eprintln!("Delete failed with http code {:?}", failure.http_code);
      if let Some(properties) = failure.error_properties() {
        eprintln!("API said: {properties}");
      }
    }
    Err(e) => return Err(e.into()),
  }

  Ok(())
}

/// Values of `results.<key>`, which the API keys by id
fn first_level<'a>(response: &'a Value, key: &str) -> Vec<&'a Value> {
  response["results"][key]
    .as_object()
    .map(|items| items.values().collect())
    .unwrap_or_default()
}
