use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use crate::storage::{DbConnection, MemberRepository};
use shared::{
    CreateMemberRequest, Member, MemberListResponse, MemberResponse, UpdateMemberRequest,
};

/// Service for managing the people contributing to the group fund
#[derive(Clone)]
pub struct MemberService {
    members: MemberRepository,
}

impl MemberService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            members: MemberRepository::new(db),
        }
    }

    /// Register a new member
    pub async fn create_member(&self, request: CreateMemberRequest) -> Result<MemberResponse> {
        info!("Creating member: name={}, phone={}", request.name, request.phone);

        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(anyhow::anyhow!("Member name cannot be empty"));
        }

        let member = Member {
            id: 0,
            name,
            phone: request.phone.trim().to_string(),
            joined_date: request.joined_date.unwrap_or_else(|| Utc::now().date_naive()),
            is_active: true,
        };

        let id = self.members.store_member(&member).await?;
        let member = Member { id, ..member };

        info!("Created member: {} with id {}", member.name, member.id);

        Ok(MemberResponse {
            member,
            success_message: "Member created successfully".to_string(),
        })
    }

    /// Get a member by id
    pub async fn get_member(&self, member_id: i64) -> Result<Option<Member>> {
        let member = self.members.get_member(member_id).await?;

        if member.is_none() {
            warn!("Member not found: {}", member_id);
        }

        Ok(member)
    }

    /// List all members
    pub async fn list_members(&self) -> Result<MemberListResponse> {
        let members = self.members.list_members().await?;
        Ok(MemberListResponse { members })
    }

    /// The candidate set for new payment entry: active members only
    pub async fn active_members(&self) -> Result<MemberListResponse> {
        let members = self.members.list_active_members().await?;
        Ok(MemberListResponse { members })
    }

    /// Update a member's details or activity flag
    pub async fn update_member(
        &self,
        member_id: i64,
        request: UpdateMemberRequest,
    ) -> Result<MemberResponse> {
        info!("Updating member: {}", member_id);

        let mut member = self
            .members
            .get_member(member_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Member not found: {}", member_id))?;

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(anyhow::anyhow!("Member name cannot be empty"));
            }
            member.name = name;
        }
        if let Some(phone) = request.phone {
            member.phone = phone.trim().to_string();
        }
        if let Some(is_active) = request.is_active {
            member.is_active = is_active;
        }

        self.members.update_member(&member).await?;

        info!("Updated member: {} with id {}", member.name, member.id);

        Ok(MemberResponse {
            member,
            success_message: "Member updated successfully".to_string(),
        })
    }

    /// Delete a member; their payments go with them
    pub async fn delete_member(&self, member_id: i64) -> Result<()> {
        info!("Deleting member: {}", member_id);

        self.members
            .get_member(member_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Member not found: {}", member_id))?;

        self.members.delete_member(member_id).await?;

        info!("Deleted member: {}", member_id);
        Ok(())
    }
}
