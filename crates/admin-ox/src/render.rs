//! Plain-text rendering of the dashboard.

use crate::{
    association::{AssociationForm, AssociationStatus},
    model::{InvitationLink, Role, User},
    state::{DashboardState, Resource, Service, ServiceState, ServiceStatus},
};
use std::fmt::Write;

const EMPTY_CELL: &str = "—";
const NO_DATA: &str = "No data.";
const FOOTER: &str = "IDs are kept as exact strings to avoid precision loss.";

/// A service status badge and its hover hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pill {
    pub text: String,
    pub hint: String,
}

#[must_use]
pub fn status_pill(service: Service, status: &ServiceStatus) -> Pill {
    let label = match status.state {
        ServiceState::Ok => "OK",
        ServiceState::Checking => "Checking…",
        ServiceState::Down => "Offline",
    };
    let hint = match (&status.state, &status.error) {
        (ServiceState::Down, Some(error)) => error.to_string(),
        _ => service.description().to_string(),
    };
    Pill {
        text: format!("{service}: {label}"),
        hint,
    }
}

/// `—` for missing or empty values.
#[must_use]
pub fn empty_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => EMPTY_CELL.to_string(),
    }
}

/// Render rows under a header with columns padded to their widest cell.
#[must_use]
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, headers.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, rule.iter().map(String::as_str), &widths);

    if rows.is_empty() {
        out.push_str(NO_DATA);
        out.push('\n');
    }
    for row in rows {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

fn render_section<T>(
    title: &str,
    what: &str,
    resource: &Resource<T>,
    headers: &[&str],
    row: impl Fn(&T) -> Vec<String>,
) -> String {
    let subtitle = if resource.loading {
        "Loading…".to_string()
    } else {
        format!("Total: {}", resource.data.len())
    };

    let mut out = format!("== {title} ({subtitle})\n");
    match &resource.error {
        Some(error) => {
            let _ = writeln!(out, "Failed to load {what}: {error}");
        }
        None => {
            let rows: Vec<Vec<String>> = resource.data.iter().map(row).collect();
            out.push_str(&render_table(headers, &rows));
        }
    }
    out
}

#[must_use]
pub fn render_roles(roles: &Resource<Role>) -> String {
    render_section("Roles", "roles", roles, &["ID", "Role", "Invitation Link"], |r| {
        vec![
            r.id.to_string(),
            r.role_name.clone(),
            empty_dash(r.invitation_link.as_deref()),
        ]
    })
}

/// `Owner (R778zuxUht), Member` style summary of a user's roles.
#[must_use]
pub fn user_roles_summary(user: &User) -> String {
    if user.roles.is_empty() {
        return EMPTY_CELL.to_string();
    }
    user.roles
        .iter()
        .map(|role| match role.invitation_link.as_deref() {
            Some(link) if role.has_invitation() => format!("{} ({link})", role.role_name),
            _ => role.role_name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[must_use]
pub fn render_users(users: &Resource<User>) -> String {
    render_section(
        "Users",
        "users",
        users,
        &["ID", "Username", "Joined", "Roles"],
        |u| {
            vec![
                u.id.to_string(),
                u.username.clone(),
                empty_dash(Some(&u.joined_date.display_short())),
                user_roles_summary(u),
            ]
        },
    )
}

#[must_use]
pub fn render_invitations(invitations: &Resource<InvitationLink>) -> String {
    render_section(
        "Invitation Links",
        "invitation links",
        invitations,
        &["ID", "Invitation Link"],
        |i| vec![i.id.to_string(), i.invitation_link.clone()],
    )
}

#[must_use]
pub fn render_association(form: &AssociationForm) -> String {
    let code = form.derived_code();
    let mut out = String::from("== Associate invitation with role\n");
    let _ = writeln!(
        out,
        "Role: {}",
        empty_dash(form.selected_role_id().map(|id| id.as_str()))
    );
    let _ = writeln!(out, "Invitation: {}", empty_dash(form.selected_invite_link()));
    let _ = writeln!(out, "Code: {}", empty_dash(Some(code.as_str())));
    let _ = writeln!(
        out,
        "Confirm: {}",
        if form.can_confirm() { "enabled" } else { "disabled" }
    );

    match form.status() {
        AssociationStatus::Idle => {}
        AssociationStatus::Saving => out.push_str("Saving…\n"),
        AssociationStatus::Saved { role_id, code } => {
            let _ = writeln!(out, "Saved: role {role_id} now uses {code}.");
        }
        AssociationStatus::Failed(message) => {
            let _ = writeln!(out, "Failed: {message}");
        }
    }
    out
}

/// The whole dashboard, optionally with the association form.
#[must_use]
pub fn render_dashboard(state: &DashboardState, form: Option<&AssociationForm>) -> String {
    let services = [Service::Database, Service::Bot];
    let pills = services.map(|service| status_pill(service, state.service(service)));

    let mut out = String::from("Discord Bot Admin\nSingle-server administrator interface\n\n");
    let _ = writeln!(out, "[{}]  [{}]", pills[0].text, pills[1].text);
    for (service, pill) in services.iter().zip(&pills) {
        let status = state.service(*service);
        if status.state == ServiceState::Down && status.error.is_some() {
            let _ = writeln!(out, "  {}", pill.hint);
        }
    }
    out.push('\n');

    for section in [
        render_roles(&state.roles),
        render_users(&state.users),
        render_invitations(&state.invitations),
    ] {
        out.push_str(&section);
        out.push('\n');
    }

    if let Some(form) = form {
        out.push_str(&render_association(form));
        out.push('\n');
    }

    out.push_str(FOOTER);
    out.push('\n');
    out
}
