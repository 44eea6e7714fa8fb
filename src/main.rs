mod app;
mod logging;
mod model;
mod theme;
mod ui;
mod widgets;

use anyhow::Result;

fn main() -> Result<()> {
    if let Some(outcome) = ui::run()? {
        let envelope = model::Envelope::from(&outcome);
        println!("{}", serde_json::to_string(&envelope)?);
    }
    Ok(())
}
