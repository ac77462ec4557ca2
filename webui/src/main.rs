use dioxus::events::FormData;
use dioxus::prelude::*;

use dioxus_router::prelude::*;

mod api;
mod types;
mod ui_utils;
use ui_utils::{fmt_money, show_toast, status_label};

// ----- Routing -----
#[derive(Routable, Clone, Debug, PartialEq)]
pub enum Route {
    #[route("/")]
    Home {},
    #[route("/payslips")]
    Payslips {},
}

pub fn main() {
    console_error_panic_hook::set_once();
    dioxus_web::launch::launch(app, vec![], Default::default());
}

fn app() -> Element {
    rsx! {
        div { // root wrapper
            div { class: "app-header",
                div { class: "container",
                    div { class: "brand",
                        span { "💶 Lohnwerk" }
                    }
                    nav {
                        Link { to: Route::Home {}, "Mitarbeiter" }
                        Link { to: Route::Payslips {}, "Abrechnungen" }
                    }
                }
            }
            Router::<Route> {}
            div { id: "toasts", class: "toast-container" }
        }
    }
}

// ----- Home: Mitarbeiterübersicht + Registrierung -----
#[component]
fn Home() -> Element {
    let employees = use_signal(|| Vec::<types::EmployeeDto>::new());
    let server_ok = use_signal(|| None as Option<bool>);
    let metrics = use_signal(|| None as Option<types::MetricsSnapshot>);
    let home_loading = use_signal(|| true);
    let err_employees = use_signal(|| None as Option<String>);
    let err_health = use_signal(|| None as Option<String>);

    // Formularfelder
    let staff_no = use_signal(|| String::new());
    let first_name = use_signal(|| String::new());
    let last_name = use_signal(|| String::new());
    let email = use_signal(|| String::new());
    let department = use_signal(|| String::new());
    let position = use_signal(|| String::new());
    let base_salary = use_signal(|| String::new());
    let hire_date = use_signal(|| String::new());

    // initial laden
    {
        let employees = employees.clone();
        let server_state = server_ok.clone();
        let metrics_state = metrics.clone();
        let loading = home_loading.clone();
        let e_emp = err_employees.clone();
        let e_health = err_health.clone();
        use_effect(move || {
            let mut loading = loading.clone();
            loading.set(true);
            let employees = employees.clone();
            let e_emp = e_emp.clone();
            let server_state = server_state.clone();
            let metrics_state = metrics_state.clone();
            let e_health = e_health.clone();
            let loading_done = loading.clone();
            spawn(async move {
                let mut employees = employees.clone();
                let mut e_emp = e_emp.clone();
                let mut server_state = server_state.clone();
                let mut metrics_state = metrics_state.clone();
                let mut e_health = e_health.clone();
                let mut loading_done = loading_done.clone();
                match api::list_employees(None).await {
                    Ok(list) => { employees.set(list); e_emp.set(None); }
                    Err(e) => e_emp.set(Some(e)),
                }
                match api::healthz().await {
                    Ok(ok) => { server_state.set(Some(ok)); e_health.set(None); }
                    Err(e) => e_health.set(Some(e)),
                }
                if let Ok(snap) = api::get_metrics().await {
                    metrics_state.set(Some(snap));
                }
                loading_done.set(false);
            });
        });
    }

    let reload = {
        let employees = employees.clone();
        let e_emp = err_employees.clone();
        let loading = home_loading.clone();
        move |_| {
            let mut employees2 = employees.clone();
            let mut e2 = e_emp.clone();
            let mut loading2 = loading.clone();
            loading2.set(true);
            wasm_bindgen_futures::spawn_local(async move {
                match api::list_employees(None).await {
                    Ok(list) => { employees2.set(list); e2.set(None); }
                    Err(e) => e2.set(Some(e)),
                }
                loading2.set(false);
            });
        }
    };

    let submit = {
        let employees = employees.clone();
        let staff_no = staff_no.clone();
        let first_name = first_name.clone();
        let last_name = last_name.clone();
        let email = email.clone();
        let department = department.clone();
        let position = position.clone();
        let base_salary = base_salary.clone();
        let hire_date = hire_date.clone();
        move |_| {
            let req = api::RegisterEmployeeReq {
                staff_no: staff_no.read().trim().to_string(),
                first_name: first_name.read().trim().to_string(),
                last_name: last_name.read().trim().to_string(),
                email: email.read().trim().to_string(),
                department: department.read().trim().to_string(),
                position: position.read().trim().to_string(),
                base_salary: base_salary.read().trim().to_string(),
                hire_date: hire_date.read().trim().to_string(),
            };
            if req.staff_no.is_empty() || req.first_name.is_empty() || req.email.is_empty() {
                show_toast("Bitte Personalnummer, Name und E-Mail angeben");
                return;
            }
            let employees = employees.clone();
            spawn(async move {
                let mut employees = employees.clone();
                match api::register_employee(&req).await {
                    Ok(emp) => {
                        show_toast(&format!("Mitarbeiter {} angelegt", emp.staff_no));
                        if let Ok(list) = api::list_employees(None).await {
                            employees.set(list);
                        }
                    }
                    Err(e) => show_toast(&format!("Fehler beim Anlegen: {}", e)),
                }
            });
        }
    };

    let server_text = match server_ok.read().to_owned() { Some(true) => "OK", Some(false) => "Fehler", None => "..." };

    rsx! {
        section { class: "panel",
            h2 { "Lohnwerk – Mitarbeiter" }
            div { class: "toolbar", style: "margin-top:6px;",
                span { "Server: {server_text}" }
                span { "Mitarbeiter: {employees.read().len()}" }
                { metrics.read().as_ref().map(|m| rsx!(
                    span { "Läufe: {m.payroll_runs_executed}" }
                    span { "Abrechnungen: {m.payslips_issued}" }
                )) }
                { home_loading.read().to_owned().then(|| rsx!(span { class: "spinner", "" })) }
                button { class: "btn", onclick: reload, "Aktualisieren" }
            }
            { err_health.read().as_ref().map(|e| rsx!(div { class: "alert alert-error", "Health-Fehler: {e}" })) }
            { err_employees.read().as_ref().map(|e| rsx!(div { class: "alert alert-error", "Fehler beim Laden: {e}" })) }
            details { open: true,
                summary { "Neuen Mitarbeiter registrieren" }
                div { style: "display:grid;grid-template-columns:repeat(auto-fill,minmax(220px,1fr));gap:8px;margin-top:8px;",
                    input { class: "form-control", value: "{staff_no}", placeholder: "Personalnummer",
                        oninput: move |e: Event<FormData>| { let mut s = staff_no.clone(); s.set(e.value().clone()); } }
                    input { class: "form-control", value: "{first_name}", placeholder: "Vorname",
                        oninput: move |e: Event<FormData>| { let mut s = first_name.clone(); s.set(e.value().clone()); } }
                    input { class: "form-control", value: "{last_name}", placeholder: "Nachname",
                        oninput: move |e: Event<FormData>| { let mut s = last_name.clone(); s.set(e.value().clone()); } }
                    input { class: "form-control", value: "{email}", placeholder: "E-Mail",
                        oninput: move |e: Event<FormData>| { let mut s = email.clone(); s.set(e.value().clone()); } }
                    input { class: "form-control", value: "{department}", placeholder: "Abteilung",
                        oninput: move |e: Event<FormData>| { let mut s = department.clone(); s.set(e.value().clone()); } }
                    input { class: "form-control", value: "{position}", placeholder: "Position",
                        oninput: move |e: Event<FormData>| { let mut s = position.clone(); s.set(e.value().clone()); } }
                    input { class: "form-control", value: "{base_salary}", placeholder: "Grundgehalt (z. B. 3500)",
                        oninput: move |e: Event<FormData>| { let mut s = base_salary.clone(); s.set(e.value().clone()); } }
                    input { class: "form-control", value: "{hire_date}", placeholder: "Eintrittsdatum (YYYY-MM-DD)",
                        oninput: move |e: Event<FormData>| { let mut s = hire_date.clone(); s.set(e.value().clone()); } }
                }
                button { class: "btn btn-primary", style: "margin-top:8px;", onclick: submit, "Registrieren" }
            }
            ul { class: "list-unstyled",
                { (employees.read().is_empty() && !home_loading.read().to_owned() && err_employees.read().is_none())
                    .then(|| rsx!(li { class: "text-muted", "Noch keine Mitarbeiter." })) }
                { employees.read().iter().map(|emp| {
                    let salary = fmt_money(&emp.base_salary);
                    let badge = status_label(&emp.status);
                    rsx!{ li { style: "display:flex;justify-content:space-between;gap:8px;padding:6px 0;border-bottom:1px solid #222533;",
                        div {
                            strong { "{emp.staff_no}" }
                            span { " {emp.first_name} {emp.last_name}" }
                            span { style: "color:#9aa0a6;", " · {emp.department} / {emp.position}" }
                        }
                        div { style: "display:flex;gap:10px;",
                            span { "{salary}" }
                            span { class: "badge", "{badge}" }
                        }
                    } }
                }) }
            }
        }
    }
}

// ----- Payslips: Abrechnungsliste mit Statusfilter -----
#[component]
fn Payslips() -> Element {
    let payslips = use_signal(|| Vec::<types::PayslipDto>::new());
    let loading = use_signal(|| true);
    let err = use_signal(|| None as Option<String>);
    let status_filter = use_signal(|| String::new());

    let load = {
        let payslips = payslips.clone();
        let loading = loading.clone();
        let err = err.clone();
        move |filter: String| {
            let mut payslips = payslips.clone();
            let mut loading = loading.clone();
            let mut err = err.clone();
            loading.set(true);
            wasm_bindgen_futures::spawn_local(async move {
                let q = api::PayslipQuery {
                    status: (!filter.is_empty()).then(|| filter),
                    ..Default::default()
                };
                match api::list_payslips(&q).await {
                    Ok(list) => { payslips.set(list); err.set(None); }
                    Err(e) => err.set(Some(e)),
                }
                loading.set(false);
            });
        }
    };

    // initial laden
    {
        let load = load.clone();
        use_effect(move || {
            load(String::new());
        });
    }

    let on_filter = {
        let status_filter = status_filter.clone();
        let load = load.clone();
        move |e: Event<FormData>| {
            let value = e.value().clone();
            let mut sf = status_filter.clone();
            sf.set(value.clone());
            load(value);
        }
    };

    rsx! {
        section { class: "panel",
            h2 { "Lohnwerk – Abrechnungen" }
            div { class: "toolbar", style: "margin-top:6px;",
                select { class: "form-control", style: "max-width:220px;", value: "{status_filter}", onchange: on_filter,
                    option { value: "", "Alle Status" }
                    option { value: "draft", "Entwurf" }
                    option { value: "available", "Verfügbar" }
                    option { value: "paid", "Ausgezahlt" }
                    option { value: "disputed", "Beanstandet" }
                    option { value: "refund_scheduled", "Erstattung geplant" }
                }
                { loading.read().to_owned().then(|| rsx!(span { class: "spinner", "" })) }
            }
            { err.read().as_ref().map(|e| rsx!(div { class: "alert alert-error", "Fehler beim Laden: {e}" })) }
            table { class: "table",
                thead {
                    tr {
                        th { "Zeitraum" }
                        th { "Grundgehalt" }
                        th { "Bonus" }
                        th { "Erstattung" }
                        th { "Netto" }
                        th { "Status" }
                    }
                }
                tbody {
                    { (payslips.read().is_empty() && !loading.read().to_owned() && err.read().is_none())
                        .then(|| rsx!(tr { td { colspan: "6", class: "text-muted", "Noch keine Abrechnungen." } })) }
                    { payslips.read().iter().map(|p| {
                        let base = fmt_money(&p.base_amount);
                        let bonus = fmt_money(&p.bonus_amount);
                        let refund = fmt_money(&p.refund_amount);
                        let net = fmt_money(&p.net_amount);
                        let badge = status_label(&p.status);
                        rsx!{ tr {
                            td { "{p.period_start} – {p.period_end}" }
                            td { "{base}" }
                            td { "{bonus}" }
                            td { "{refund}" }
                            td { "{net}" }
                            td { span { class: "badge", "{badge}" } }
                        } }
                    }) }
                }
            }
        }
    }
}
