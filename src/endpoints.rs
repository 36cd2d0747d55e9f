/// Logical API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Static,
    Fixtures,
    GameweekFixtures,
    GameweekLive,
    PlayerSummary,
    Settings,
    Me,
    User,
    UserHistory,
    UserPicks,
    LeagueClassic,
    LeagueH2h,
    LeagueH2hMatches,
}

/// Templates are relative to the API base; each `{}` takes one argument in order.
const ENDPOINTS: &[(Endpoint, &str)] = &[
    (Endpoint::Static, "bootstrap-static/"),
    (Endpoint::Fixtures, "fixtures/"),
    (Endpoint::GameweekFixtures, "fixtures/?event={}"),
    (Endpoint::GameweekLive, "event/{}/live/"),
    (Endpoint::PlayerSummary, "element-summary/{}/"),
    (Endpoint::Settings, "game-settings/"),
    (Endpoint::Me, "me/"),
    (Endpoint::User, "entry/{}/"),
    (Endpoint::UserHistory, "entry/{}/history/"),
    (Endpoint::UserPicks, "entry/{}/event/{}/picks/"),
    (Endpoint::LeagueClassic, "leagues-classic/{}/standings/"),
    (Endpoint::LeagueH2h, "leagues-h2h/{}/standings/"),
    (Endpoint::LeagueH2hMatches, "leagues-h2h-matches/league/{}/?{}page={}"),
];

impl Endpoint {
    pub fn template(self) -> &'static str {
        ENDPOINTS
            .iter()
            .find(|(endpoint, _)| *endpoint == self)
            .map(|(_, template)| *template)
            .unwrap_or_default()
    }

    /// Builds the full URL. Surplus placeholders are left empty; surplus args are ignored.
    pub fn url(self, base: &str, args: &[&dyn std::fmt::Display]) -> String {
        let mut out = String::with_capacity(base.len() + 48);
        out.push_str(base);
        let mut args = args.iter();
        let mut rest = self.template();
        while let Some(idx) = rest.find("{}") {
            out.push_str(&rest[..idx]);
            if let Some(arg) = args.next() {
                out.push_str(&arg.to_string());
            }
            rest = &rest[idx + 2..];
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::Endpoint;

    const BASE: &str = "https://fantasy.premierleague.com/api/";

    #[test]
    fn every_endpoint_has_a_template() {
        for endpoint in [
            Endpoint::Static,
            Endpoint::Fixtures,
            Endpoint::GameweekFixtures,
            Endpoint::GameweekLive,
            Endpoint::PlayerSummary,
            Endpoint::Settings,
            Endpoint::Me,
            Endpoint::User,
            Endpoint::UserHistory,
            Endpoint::UserPicks,
            Endpoint::LeagueClassic,
            Endpoint::LeagueH2h,
            Endpoint::LeagueH2hMatches,
        ] {
            assert!(!endpoint.template().is_empty(), "{endpoint:?}");
        }
    }

    #[test]
    fn resolves_positional_args() {
        assert_eq!(
            Endpoint::UserPicks.url(BASE, &[&91928, &6]),
            "https://fantasy.premierleague.com/api/entry/91928/event/6/picks/"
        );
        assert_eq!(
            Endpoint::LeagueH2hMatches.url(BASE, &[&946125, &"event=3&", &2]),
            "https://fantasy.premierleague.com/api/leagues-h2h-matches/league/946125/?event=3&page=2"
        );
        assert_eq!(
            Endpoint::Static.url(BASE, &[]),
            "https://fantasy.premierleague.com/api/bootstrap-static/"
        );
    }
}
