//! Line-driven shell over the screens, for local testing.
//!
//! Each input line is one user action on the current route. The shell owns
//! one controller per screen and drops it when navigating away, which also
//! cancels any pending dispatch timers.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::debug;

use crate::auth::{AuthService, LoginScreen};
use crate::config::AppConfig;
use crate::dispatch::{DispatchOutcome, DispatchSession, ScreenConfig, SearchOutcome, SearchScreen};
use crate::error::{AuthError, Result};
use crate::geocode::{Geocoder, KakaoGeocoder, MapPanel, MapSearch};
use crate::navigation::Route;
use crate::onboarding::{
    AllergyCategory, Gender, OnboardingController, StepKind, StepOutcome, YesNo,
};
use crate::store::{KeyValueStore, ProfileRepository};

pub const HELP: &str = "\
global:      help | route | go <path> | status | logout | quit
/login:      email <addr> | password <pw> | show | login
/onboarding: basic <name> <YYYY-MM-DD> <male|female> <height> <weight>
             allergy yes|no | allergy pick <category> | allergy detail <category> <text>
             allergy other <text> | allergy done
             med yes|no | med set <n> <name> <dosage> <frequency> | med add | med rm <n> | med done
             disease yes|no | disease set <n> <name> | disease add | disease rm <n> | disease done
             back | next
/search-map: symptom <text> | patient <id> | search | list | tap <id> | multi on|off | call
             map <address>";

/// Result of handling one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Quit,
}

pub struct Shell {
    config: AppConfig,
    repo: ProfileRepository,
    auth: AuthService,
    route: Route,
    login: LoginScreen,
    onboarding: Option<OnboardingController>,
    dispatch: Option<DispatchSession>,
    map: MapSearch,
}

impl Shell {
    /// Start on the cover page.
    pub fn new(config: AppConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let repo = ProfileRepository::new(store);
        let geocoder = config
            .kakao_api_key
            .clone()
            .map(|key| Arc::new(KakaoGeocoder::new(key)) as Arc<dyn Geocoder>);
        Self {
            auth: AuthService::new(repo.clone()),
            repo,
            config,
            route: Route::Cover,
            login: LoginScreen::new(),
            onboarding: None,
            dispatch: None,
            map: MapSearch::new(geocoder),
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn onboarding(&self) -> Option<&OnboardingController> {
        self.onboarding.as_ref()
    }

    pub fn dispatch(&self) -> Option<&DispatchSession> {
        self.dispatch.as_ref()
    }

    /// Navigate, redirecting to `/login` when the target needs a session.
    pub async fn navigate(&mut self, target: Route) -> Result<Route> {
        let authenticated = self.auth.is_authenticated().await?;
        let route = target.resolve(authenticated);
        if route != Route::SearchMap {
            self.dispatch = None;
        }
        if route != Route::Onboarding {
            self.onboarding = None;
        }
        match route {
            Route::Login => self.login = LoginScreen::new(),
            Route::Onboarding if self.onboarding.is_none() => {
                self.onboarding = Some(OnboardingController::new(self.repo.clone()));
            }
            Route::SearchMap if self.dispatch.is_none() => {
                let screen = SearchScreen::new(ScreenConfig::from(&self.config));
                self.dispatch = Some(DispatchSession::new(screen, &self.config));
            }
            _ => {}
        }
        debug!(target = %target, route = %route, "Navigated");
        self.route = route;
        Ok(route)
    }

    pub async fn handle(&mut self, line: &str) -> Result<Flow> {
        let line = line.trim();
        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        let out = match cmd {
            "" => String::new(),
            "quit" | "/quit" | "exit" => return Ok(Flow::Quit),
            "help" => HELP.to_string(),
            "route" => self.route.to_string(),
            "go" => match rest.parse::<Route>() {
                Ok(target) => {
                    let landed = self.navigate(target).await?;
                    format!("→ {landed}")
                }
                Err(e) => e,
            },
            "logout" => {
                self.auth.logout().await?;
                let landed = self.navigate(Route::Login).await?;
                format!("Signed out → {landed}")
            }
            "status" => self.status().await,
            _ => match self.route {
                Route::Login => self.handle_login(cmd, rest).await?,
                Route::Onboarding => self.handle_onboarding(cmd, rest).await,
                Route::SearchMap => self.handle_search(cmd, rest).await,
                Route::Cover if cmd == "start" => {
                    let landed = self.navigate(Route::SearchMap).await?;
                    format!("→ {landed}")
                }
                route => format!("'{cmd}' is not available on {route}. Type 'help'."),
            },
        };
        Ok(Flow::Continue(out))
    }

    async fn status(&self) -> String {
        let mut out = format!("route: {}", self.route);
        if let Some(onboarding) = &self.onboarding {
            let status = serde_json::to_string_pretty(&onboarding.status()).unwrap_or_default();
            let _ = write!(out, "\nonboarding: {status}");
        }
        if let Some(session) = &self.dispatch {
            let line = session
                .view(|s| {
                    format!(
                        "search: phase={:?} mode={:?} selected={:?} sheet_open={}",
                        s.phase(),
                        s.mode(),
                        s.selected(),
                        s.is_sheet_open()
                    )
                })
                .await;
            let _ = write!(out, "\n{line}");
        }
        out
    }

    async fn handle_login(&mut self, cmd: &str, rest: &str) -> Result<String> {
        let out = match cmd {
            "email" => {
                self.login.set_email(rest);
                self.login.blur_email();
                self.login.email_error().unwrap_or("ok").to_string()
            }
            "password" => {
                self.login.set_password(rest);
                self.login
                    .password_indicators()
                    .iter()
                    .map(|(req, status)| format!("{}:{status:?}", req.label()))
                    .collect::<Vec<_>>()
                    .join("  ")
            }
            "show" => format!("password visible: {}", self.login.toggle_password_visibility()),
            "login" => match self.login.submit(&self.auth).await {
                Ok(route) => {
                    let landed = self.navigate(route).await?;
                    format!("→ {landed}")
                }
                Err(AuthError::Repository(e)) => return Err(AuthError::Repository(e).into()),
                Err(e) => e.alert_message().to_string(),
            },
            _ => format!("Unknown command: {cmd}"),
        };
        Ok(out)
    }

    async fn handle_onboarding(&mut self, cmd: &str, rest: &str) -> String {
        let Some(c) = self.onboarding.as_mut() else {
            return "Onboarding is not active".to_string();
        };
        let args: Vec<&str> = rest.split_whitespace().collect();
        let (sub, tail) = rest.split_once(' ').unwrap_or((rest, ""));

        let outcome = match (cmd, sub) {
            ("basic", _) => {
                if args.len() != 5 {
                    return "usage: basic <name> <YYYY-MM-DD> <male|female> <height> <weight>"
                        .to_string();
                }
                let gender = args[2].parse::<Gender>().ok();
                c.edit_basic(|f| {
                    f.name = args[0].to_string();
                    f.birth_date = args[1].to_string();
                    f.gender = gender;
                    f.height = args[3].to_string();
                    f.weight = args[4].to_string();
                });
                c.submit_basic()
            }
            ("allergy", "pick") => match tail.trim().parse::<AllergyCategory>() {
                Ok(cat) => {
                    let on = c.edit_allergy(|f| f.toggle(cat));
                    return format!("{}: {on:?}", cat.label());
                }
                Err(e) => return e,
            },
            ("allergy", "detail") => {
                let (cat, text) = tail.trim().split_once(' ').unwrap_or((tail.trim(), ""));
                match cat.parse::<AllergyCategory>() {
                    Ok(cat) => {
                        c.edit_allergy(|f| f.set_detail(cat, text));
                        StepOutcome::Stayed
                    }
                    Err(e) => return e,
                }
            }
            ("allergy", "other") => {
                c.edit_allergy(|f| f.other = tail.trim().to_string());
                StepOutcome::Stayed
            }
            ("allergy", "done") => c.submit_allergy(),
            ("allergy", answer) => match answer.parse::<YesNo>() {
                Ok(answer) => c.choose_allergy(answer),
                Err(e) => return e,
            },
            ("med", "set") => {
                let parts: Vec<&str> = tail.split_whitespace().collect();
                let [n, name, dosage, frequency] = parts[..] else {
                    return "usage: med set <n> <name> <dosage> <frequency>".to_string();
                };
                let Ok(index) = n.parse::<usize>() else {
                    return format!("Invalid row: {n}");
                };
                let set = c.edit_medication(|f| match f.row_mut(index) {
                    Some(row) => {
                        row.name = name.to_string();
                        row.dosage = dosage.to_string();
                        row.frequency = frequency.to_string();
                        true
                    }
                    None => false,
                });
                if set != Some(true) {
                    return format!("No medication row {index}");
                }
                StepOutcome::Stayed
            }
            ("med", "add") => {
                c.add_medication_row();
                StepOutcome::Stayed
            }
            ("med", "rm") => match tail.trim().parse::<usize>() {
                Ok(index) if c.remove_medication_row(index) => StepOutcome::Stayed,
                _ => return "Cannot remove that row".to_string(),
            },
            ("med", "done") => c.submit_medication(),
            ("med", answer) => match answer.parse::<YesNo>() {
                Ok(answer) => c.choose_medication(answer),
                Err(e) => return e,
            },
            ("disease", "set") => {
                let (n, name) = tail.trim().split_once(' ').unwrap_or((tail.trim(), ""));
                let Ok(index) = n.parse::<usize>() else {
                    return format!("Invalid row: {n}");
                };
                if c.edit_disease(|f| f.set_row(index, name.trim())) != Some(true) {
                    return format!("No disease row {index}");
                }
                StepOutcome::Stayed
            }
            ("disease", "add") => {
                c.edit_disease(|f| f.add_row());
                StepOutcome::Stayed
            }
            ("disease", "rm") => match tail.trim().parse::<usize>() {
                Ok(index) if c.edit_disease(|f| f.remove_row(index)) == Some(true) => {
                    StepOutcome::Stayed
                }
                _ => return "Cannot remove that row".to_string(),
            },
            ("disease", "done") => c.submit_disease().await,
            ("disease", answer) => match answer.parse::<YesNo>() {
                Ok(answer) => c.choose_disease(answer).await,
                Err(e) => return e,
            },
            ("back", _) => c.back(),
            ("next", _) => match c.proceed() {
                Some(route) => StepOutcome::Exited(route),
                None => return "Finish onboarding first".to_string(),
            },
            _ => return format!("Unknown command: {cmd}"),
        };

        let kind = c.kind();
        match outcome {
            StepOutcome::Exited(route) => match self.navigate(route).await {
                Ok(landed) => format!("→ {landed}"),
                Err(e) => format!("Navigation failed: {e}"),
            },
            StepOutcome::Moved(StepKind::Complete) => {
                "가입이 완료되었습니다. 'next' to continue".to_string()
            }
            StepOutcome::Moved(step) => format!("step: {step}"),
            StepOutcome::Revealed => format!("step: {kind} (details)"),
            StepOutcome::Stayed => format!("step: {kind}"),
            StepOutcome::Rejected(errors) => errors.to_string(),
        }
    }

    async fn handle_search(&mut self, cmd: &str, rest: &str) -> String {
        if cmd == "map" {
            self.map.set_address(rest);
            self.map.search().await;
            let mut out = match self.map.panel() {
                MapPanel::Map { center, label } => {
                    format!("map center ({center}) {}", label.unwrap_or_default())
                }
                MapPanel::Unavailable { title, detail } => format!("{title}\n{detail}"),
            };
            if let Some(err) = self.map.error_message() {
                let _ = write!(out, "\n{err}");
            }
            return out;
        }

        let Some(session) = self.dispatch.as_mut() else {
            return "Search screen is not active".to_string();
        };
        match cmd {
            "symptom" => {
                session.with_screen(|s| s.set_symptom(rest)).await;
                "ok".to_string()
            }
            "patient" => match rest.parse::<u32>() {
                Ok(id) => {
                    session
                        .with_screen(|s| {
                            s.select_patient(id);
                            s.selected_patient()
                                .map(|p| format!("patient: {}", p.label))
                                .unwrap_or_else(|| "patient: none".to_string())
                        })
                        .await
                }
                Err(_) => format!("Invalid patient id: {rest}"),
            },
            "search" => match session.submit_search().await {
                SearchOutcome::Opened => list_hospitals(session).await,
                SearchOutcome::Rejected(toast) => toast.message,
            },
            "list" => list_hospitals(session).await,
            "tap" => match rest.parse::<u32>() {
                Ok(id) => {
                    let (changed, selected) = session
                        .with_screen(|s| (s.tap_hospital(id), s.selected().clone()))
                        .await;
                    if changed {
                        format!("selected: {selected:?}")
                    } else {
                        format!("hospital {id} cannot be selected")
                    }
                }
                Err(_) => format!("Invalid hospital id: {rest}"),
            },
            "multi" => {
                let on = rest == "on";
                session
                    .with_screen(|s| {
                        if on {
                            s.enter_multi_select();
                        } else {
                            s.exit_multi_select();
                        }
                        format!("mode: {:?}", s.mode())
                    })
                    .await
            }
            "call" => match session.dispatch().await {
                DispatchOutcome::Connecting(ids) => format!("연결 중... {ids:?}"),
                DispatchOutcome::Rejected(toast) => toast.message,
                DispatchOutcome::Ignored => "Search first".to_string(),
            },
            _ => format!("Unknown command: {cmd}"),
        }
    }
}

async fn list_hospitals(session: &DispatchSession) -> String {
    session
        .view(|s| {
            s.hospitals()
                .iter()
                .map(|h| {
                    let mark = if s.selected().contains(&h.id) { "*" } else { " " };
                    format!(
                        "{mark} [{}] {} {} {} 응급 {} / 가용 {} / 전체 {} ({})",
                        h.id,
                        h.name,
                        h.distance_label(),
                        h.address,
                        h.emergency_bed_count,
                        h.available_bed_count,
                        h.total_bed_count,
                        h.status.label()
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
        .await
}
