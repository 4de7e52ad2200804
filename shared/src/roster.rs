/// Known agents and their team codes. Used to fill in a team when a payload omits it.
const KNOWN_AGENTS: &[(&str, &str)] = &[
    ("Trevor Berends", "adaptive"),
    ("Tommy Sheridan", "n3c"),
    ("Aaron Masters", "dialed"),
    ("Darien Meza", "n3c"),
    ("Mason Pin-Bowder", "adaptive"),
    ("Matt Walker", "wkr"),
    ("Reese Trujillo", "afg"),
    ("Sean Fisher", "afg"),
    ("Tyler Harshbarger", "blackoak"),
    ("Andrew S", "adaptive"),
    ("Kaden Ramey", "dialed"),
    ("Jack Warren", "wkr"),
    ("Max Hanson", "wkr"),
    ("Seamus Hayes", "adaptive"),
    ("Tanner Forston", "dialed"),
    ("Caleb Dotterer", "adaptive"),
    ("Gino", "afg"),
    ("Peewee", "wkr"),
    ("Aiden Verdi", "afg"),
    ("Darrell H", "dialed"),
    ("Elijah Wilburn", "dialed"),
    ("Johan Serna", "afg"),
    ("Eric Eggatt", "afg"),
    ("Caden Harshbarger", "blackoak"),
    ("Brandon Richardson", "afg"),
    ("Noah Doddridge", "n3c"),
    ("Orison Nakvoss", "adaptive"),
    ("Landen Krantz", "wkr"),
    ("Deangelo Weekly", "dialed"),
    ("Decarlos Frazier", "adaptive"),
    ("Rylan P", "afg"),
    ("Joshua Taylor", "afg"),
    ("Daniel Zelenko", "afg"),
    ("Ahjay Baez", "dialed"),
    ("Alex Pappas", "dialed"),
    ("Donovon P. Rogers", "adaptive"),
    ("Dovi Clermont", "blackoak"),
    ("Freedom", "blackoak"),
    ("Giancarlo Palmeri", "adaptive"),
    ("Jared Aigner", "afg"),
    ("Jocelyn", "blackoak"),
    ("Joel Rodriguez", "wkr"),
    ("Josh Z", "afg"),
    ("Kaelyn Jones", "n3c"),
    ("Matthew Hedquist", "adaptive"),
    ("Tayden Tindle", "adaptive"),
    ("Irv Bevelle", "n3c"),
];

/// Case-insensitive roster lookup by display name.
pub fn team_for_name(name: &str) -> Option<&'static str> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    KNOWN_AGENTS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, team)| *team)
}

#[cfg(test)]
mod tests {
    use super::team_for_name;

    #[test]
    fn lookup_ignores_case_and_padding() {
        assert_eq!(team_for_name("matt walker"), Some("wkr"));
        assert_eq!(team_for_name("  Gino "), Some("afg"));
    }

    #[test]
    fn unknown_or_blank_names_have_no_team() {
        assert_eq!(team_for_name("Nobody Here"), None);
        assert_eq!(team_for_name("   "), None);
    }
}
