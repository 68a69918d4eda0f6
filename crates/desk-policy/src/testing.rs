// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fixtures and proptest strategies shared by the unit tests.
//!
//! Strategies draw ids from small fixed pools so that generated actors and
//! tickets frequently share an organization or a user.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use uuid::Uuid;

use crate::actor::Actor;
use crate::ticket::{Ticket, TicketCategory, TicketPriority, TicketStatus};
use crate::types::{OrgId, Role, TicketId, UserId};

pub fn org_admin(org: OrgId) -> Actor {
	Actor::member(UserId::generate(), Role::OrgAdmin, org)
}

pub fn contractor(org: OrgId) -> Actor {
	Actor::member(UserId::generate(), Role::Contractor, org)
}

pub fn user(org: OrgId) -> Actor {
	Actor::member(UserId::generate(), Role::User, org)
}

pub fn sample_ticket(org: OrgId, requester: UserId) -> Ticket {
	let created = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
	Ticket {
		id: TicketId::generate(),
		organization_id: org,
		title: "Broken freezer".to_string(),
		description: "Walk-in freezer at the back is not holding temperature".to_string(),
		status: TicketStatus::Open,
		priority: TicketPriority::High,
		category: TicketCategory::Maintenance,
		site_location: Some("Store 12".to_string()),
		requester_id: requester,
		admin_id: None,
		contractor_id: None,
		contractor_name: None,
		estimated_duration: None,
		scheduled_arrival: None,
		created_at: created,
		updated_at: created,
		version: 1,
	}
}

fn pooled_org() -> impl Strategy<Value = OrgId> {
	(1u128..=3).prop_map(|n| OrgId::new(Uuid::from_u128(n)))
}

fn pooled_user() -> impl Strategy<Value = UserId> {
	(100u128..=104).prop_map(|n| UserId::new(Uuid::from_u128(n)))
}

pub fn arb_status() -> impl Strategy<Value = TicketStatus> {
	prop::sample::select(TicketStatus::all().to_vec())
}

/// A `(from, to)` pair that is an edge of the transition graph.
pub fn arb_edge() -> impl Strategy<Value = (TicketStatus, TicketStatus)> {
	let edges: Vec<_> = TicketStatus::all()
		.iter()
		.flat_map(|from| {
			crate::transition::next_statuses(*from)
				.into_iter()
				.map(move |to| (*from, to))
		})
		.collect();
	prop::sample::select(edges)
}

pub fn arb_role() -> impl Strategy<Value = Role> {
	prop_oneof![
		Just(Role::SuperAdmin),
		Just(Role::OrgAdmin),
		Just(Role::Contractor),
		Just(Role::User),
	]
}

pub fn arb_actor() -> impl Strategy<Value = Actor> {
	(arb_role(), pooled_user(), pooled_org()).prop_map(|(role, id, org)| match role {
		Role::SuperAdmin => Actor::super_admin(id),
		role => Actor::member(id, role, org),
	})
}

pub fn arb_ticket() -> impl Strategy<Value = Ticket> {
	(
		pooled_org(),
		arb_status(),
		pooled_user(),
		proptest::option::of(pooled_user()),
		proptest::option::of(pooled_user()),
	)
		.prop_map(|(org, status, requester, admin, contractor)| {
			let mut ticket = sample_ticket(org, requester);
			ticket.status = status;
			ticket.admin_id = admin;
			ticket.contractor_id = contractor;
			ticket.contractor_name = contractor.map(|id| format!("contractor {id}"));
			ticket
		})
}
