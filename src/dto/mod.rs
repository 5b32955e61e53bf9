pub mod gateway_dto;
