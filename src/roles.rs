//! Staff roles and the screens each role may open.
//!
//! Visibility is a static table: every [`Role`] maps to a fixed set of
//! [`Screen`]s, and the navigation menu is the catalogue filtered by that
//! set.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::YooPayError;

/// Back-office staff role, stored in `user_metadata.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Customer support.
    Atendimento,
    /// Payments operations.
    Pagamento,
    /// Finance.
    Financeiro,
    /// Supervisor; sees everything.
    Supervisor,
}

/// A back-office screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    /// Overview dashboard.
    Dashboard,
    /// Merchant registration (lookup, bank details, fees).
    Cadastro,
    /// PIX orders.
    PedidosPix,
    /// Transactions.
    Transacoes,
    /// Merchant accreditation requests.
    Credenciamentos,
    /// Items pending approval, including PIX validations.
    Pendentes,
    /// Payouts.
    Repasses,
    /// Reports.
    Relatorios,
    /// Audit logs.
    Logs,
}

/// Entry of the navigation menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    /// Screen the entry opens.
    pub screen: Screen,
    /// Menu title.
    pub title: &'static str,
    /// Route path.
    pub path: &'static str,
}

/// Navigation catalogue in menu order.
pub const NAVIGATION: &[NavItem] = &[
    NavItem {
        screen: Screen::Dashboard,
        title: "Dashboard",
        path: "/",
    },
    NavItem {
        screen: Screen::Cadastro,
        title: "Cadastro",
        path: "/cadastro",
    },
    NavItem {
        screen: Screen::PedidosPix,
        title: "Pedidos via PIX",
        path: "/pedidos",
    },
    NavItem {
        screen: Screen::Transacoes,
        title: "Transações",
        path: "/transacoes",
    },
    NavItem {
        screen: Screen::Credenciamentos,
        title: "Credenciamentos",
        path: "/credenciamentos",
    },
    NavItem {
        screen: Screen::Pendentes,
        title: "Pendentes",
        path: "/pendentes",
    },
    NavItem {
        screen: Screen::Repasses,
        title: "Repasses",
        path: "/repasses",
    },
    NavItem {
        screen: Screen::Relatorios,
        title: "Relatórios",
        path: "/relatorios",
    },
    NavItem {
        screen: Screen::Logs,
        title: "Logs",
        path: "/logs",
    },
];

impl Role {
    /// All roles, in badge order.
    pub const ALL: [Self; 4] = [
        Self::Atendimento,
        Self::Pagamento,
        Self::Financeiro,
        Self::Supervisor,
    ];

    /// Screens this role may open.
    #[inline]
    #[must_use]
    pub const fn capabilities(self) -> &'static [Screen] {
        match self {
            Self::Atendimento => &[Screen::Dashboard, Screen::Cadastro, Screen::PedidosPix],
            Self::Pagamento => &[
                Screen::Dashboard,
                Screen::PedidosPix,
                Screen::Transacoes,
                Screen::Credenciamentos,
                Screen::Pendentes,
            ],
            Self::Financeiro => &[
                Screen::Dashboard,
                Screen::Transacoes,
                Screen::Repasses,
                Screen::Relatorios,
            ],
            Self::Supervisor => &[
                Screen::Dashboard,
                Screen::Cadastro,
                Screen::PedidosPix,
                Screen::Transacoes,
                Screen::Credenciamentos,
                Screen::Pendentes,
                Screen::Repasses,
                Screen::Relatorios,
                Screen::Logs,
            ],
        }
    }

    /// Returns `true` if the role may open `screen`.
    #[inline]
    #[must_use]
    pub fn can_access(self, screen: Screen) -> bool {
        self.capabilities().contains(&screen)
    }

    /// Returns the role's display label.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Atendimento => "Atendimento",
            Self::Pagamento => "Pagamento",
            Self::Financeiro => "Financeiro",
            Self::Supervisor => "Supervisor",
        }
    }

    /// Returns the wire name stored in user metadata.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Atendimento => "atendimento",
            Self::Pagamento => "pagamento",
            Self::Financeiro => "financeiro",
            Self::Supervisor => "supervisor",
        }
    }
}

impl FromStr for Role {
    type Err = YooPayError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| YooPayError::Validation(format!("perfil desconhecido: {wanted}")))
    }
}

impl core::fmt::Display for Role {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl Screen {
    /// Returns the navigation entry for this screen.
    #[inline]
    #[must_use]
    pub fn nav_item(self) -> Option<&'static NavItem> {
        NAVIGATION.iter().find(|item| item.screen == self)
    }
}

/// Returns the menu entries visible to `role`, in menu order.
#[inline]
#[must_use]
pub fn navigation_for(role: Role) -> Vec<&'static NavItem> {
    NAVIGATION
        .iter()
        .filter(|item| role.can_access(item.screen))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(role: Role) -> Vec<&'static str> {
        navigation_for(role).iter().map(|item| item.title).collect()
    }

    #[test]
    fn supervisor_sees_every_screen() {
        assert_eq!(navigation_for(Role::Supervisor).len(), NAVIGATION.len());
    }

    #[test]
    fn atendimento_menu() {
        assert_eq!(
            titles(Role::Atendimento),
            vec!["Dashboard", "Cadastro", "Pedidos via PIX"]
        );
    }

    #[test]
    fn financeiro_menu() {
        assert_eq!(
            titles(Role::Financeiro),
            vec!["Dashboard", "Transações", "Repasses", "Relatórios"]
        );
    }

    #[test]
    fn only_supervisor_sees_logs() {
        for role in Role::ALL {
            assert_eq!(role.can_access(Screen::Logs), role == Role::Supervisor);
        }
    }

    #[test]
    fn cadastro_is_restricted() {
        assert!(Role::Atendimento.can_access(Screen::Cadastro));
        assert!(!Role::Pagamento.can_access(Screen::Cadastro));
        assert!(!Role::Financeiro.can_access(Screen::Cadastro));
    }

    #[test]
    fn every_screen_has_a_nav_entry() {
        for &screen in Role::Supervisor.capabilities() {
            assert!(screen.nav_item().is_some());
        }
    }

    #[test]
    fn role_parse_and_serde() {
        assert_eq!("Supervisor".parse::<Role>().unwrap(), Role::Supervisor);
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(serde_json::to_string(&Role::Pagamento).unwrap(), r#""pagamento""#);
        assert_eq!(Role::Financeiro.to_string(), "Financeiro");
    }
}
