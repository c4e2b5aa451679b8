//! Libellés affichés par le lecteur

/// Libellé tant qu'aucun morceau n'est chargé
pub const LOADING_LABEL: &str = "Loading tracks…";

/// Invite affichée quand la lecture automatique a été refusée
pub const BLOCKED_HINT: &str = "Tap play";

/// Formate une durée en `m:ss`
///
/// ```
/// use jingleplayer::display::format_time;
///
/// assert_eq!(format_time(0.0), "0:00");
/// assert_eq!(format_time(75.9), "1:15");
/// assert_eq!(format_time(f64::NAN), "0:00");
/// ```
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(9.0), "0:09");
        assert_eq!(format_time(600.0), "10:00");
        assert_eq!(format_time(-3.0), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
    }
}
