use crate::{controller::ResponseViewModel, model::WeatherRecord};

pub const WAITING_MESSAGE: &str = "Waiting for response...";

/// Plain-text rendering of the current view model.
pub fn render(view: &ResponseViewModel) -> String {
    match view {
        ResponseViewModel::Empty => WAITING_MESSAGE.to_string(),
        ResponseViewModel::ErrorMessage(message) => message.clone(),
        ResponseViewModel::WeatherRecord(record) => render_record(record),
    }
}

pub fn render_record(record: &WeatherRecord) -> String {
    format!(
        "Location: {}, {}\n\
         Temperature: {}\n\
         Condition: {}\n\
         Humidity: {}\n\
         Wind Speed: {}\n\
         Last Updated: {}",
        record.city,
        record.country,
        record.temperature,
        record.condition,
        record.humidity,
        record.wind_speed,
        record.last_updated,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_view_is_waiting() {
        assert_eq!(render(&ResponseViewModel::Empty), "Waiting for response...");
    }

    #[test]
    fn record_renders_six_lines() {
        let record = WeatherRecord {
            city: "London".into(),
            country: "United Kingdom".into(),
            temperature: "11.0°C".into(),
            condition: "Light rain".into(),
            humidity: "87%".into(),
            wind_speed: "14.4 km/h".into(),
            last_updated: "2024-03-01 09:45".into(),
        };

        let text = render(&ResponseViewModel::WeatherRecord(record));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "Location: London, United Kingdom");
        assert_eq!(lines[4], "Wind Speed: 14.4 km/h");
        assert_eq!(lines[5], "Last Updated: 2024-03-01 09:45");
    }
}
