//! UsersService gRPC implementation.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::instrument;

use sso_proto::v1::users_service_server::UsersService;
use sso_proto::v1::{
    GetMeRequest, GetUserByEmailRequest, GetUserRequest, GetUsersRequest, GetUsersResponse,
    UpdateUserProfileRequest, UpdateUserProfileResponse, User,
};

use super::grpc_util::{id_from_wire, request_context, user_to_proto};
use crate::error::SsoError;
use crate::storage::{Pagination, ProfilePatch};
use crate::usecases::UseCases;

pub struct UsersServiceImpl {
    usecases: Arc<UseCases>,
}

impl UsersServiceImpl {
    pub const fn new(usecases: Arc<UseCases>) -> Self {
        Self { usecases }
    }
}

#[tonic::async_trait]
impl UsersService for UsersServiceImpl {
    #[instrument(skip(self, request), fields(rpc = "GetUser"))]
    async fn get_user(&self, request: Request<GetUserRequest>) -> Result<Response<User>, Status> {
        let ctx = request_context(&request);
        let req = request.into_inner();

        let id = id_from_wire(req.id).ok_or(SsoError::UserNotFound)?;
        let user = self.usecases.get_user_by_id(&ctx, id).await?;
        Ok(Response::new(user_to_proto(user)))
    }

    #[instrument(skip(self, request), fields(rpc = "GetUserByEmail"))]
    async fn get_user_by_email(
        &self,
        request: Request<GetUserByEmailRequest>,
    ) -> Result<Response<User>, Status> {
        let ctx = request_context(&request);
        let req = request.into_inner();

        let user = self.usecases.get_user_by_email(&ctx, &req.email).await?;
        Ok(Response::new(user_to_proto(user)))
    }

    #[instrument(skip(self, request), fields(rpc = "GetUsers"))]
    async fn get_users(
        &self,
        request: Request<GetUsersRequest>,
    ) -> Result<Response<GetUsersResponse>, Status> {
        let ctx = request_context(&request);
        let req = request.into_inner();

        let pagination = req.pagination.map(|p| Pagination {
            limit: p.limit,
            offset: u64::from(p.offset),
        });
        let users = self.usecases.get_all_users(&ctx, pagination).await?;

        Ok(Response::new(GetUsersResponse {
            users: users.into_iter().map(user_to_proto).collect(),
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "GetMe"))]
    async fn get_me(&self, request: Request<GetMeRequest>) -> Result<Response<User>, Status> {
        let ctx = request_context(&request);
        let req = request.into_inner();

        let user = self.usecases.get_me(&ctx, &req.access_token).await?;
        Ok(Response::new(user_to_proto(user)))
    }

    #[instrument(skip(self, request), fields(rpc = "UpdateUserProfile"))]
    async fn update_user_profile(
        &self,
        request: Request<UpdateUserProfileRequest>,
    ) -> Result<Response<UpdateUserProfileResponse>, Status> {
        let ctx = request_context(&request);
        let req = request.into_inner();

        let patch = ProfilePatch {
            display_name: req.display_name,
            phone: req.phone,
            telegram: req.telegram,
            avatar: req.avatar,
        };
        self.usecases
            .update_user_profile(&ctx, &req.access_token, patch)
            .await?;
        Ok(Response::new(UpdateUserProfileResponse {}))
    }
}
