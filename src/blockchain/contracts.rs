//! ABI bindings for the two contracts the harvester talks to.

use alloy::sol;

sol! {
    /// Protocol rewards contract.
    #[derive(Debug)]
    interface IRewards {
        struct UserClaim {
            uint256 buffer;
            bool claimStatus;
        }

        function claimReward() external;

        function currentEpoch() external view returns (uint256);

        function userGenesisClaimStatus(address user) external view returns (bool status);

        function userClaimStatus(address user, uint256 epochID) external view returns (UserClaim claim);
    }

    /// Asset bridge contract.
    #[derive(Debug)]
    interface IBridge {
        function bridgeAsset(
            uint32 destinationNetwork,
            address destinationAddress,
            uint256 amount,
            address token,
            bool forceUpdateGlobalExitRoot,
            bytes permitData
        ) external payable;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, Bytes, U256};
    use alloy::sol_types::SolCall;

    #[test]
    fn test_claim_reward_selector() {
        // keccak256("claimReward()")[..4]
        let data = IRewards::claimRewardCall {}.abi_encode();
        assert_eq!(data.len(), 4);
        assert_eq!(data, IRewards::claimRewardCall::SELECTOR.to_vec());
    }

    #[test]
    fn test_bridge_asset_encoding_layout() {
        let call = IBridge::bridgeAssetCall {
            destinationNetwork: 0,
            destinationAddress: Address::repeat_byte(0x11),
            amount: U256::from(1u64),
            token: Address::ZERO,
            forceUpdateGlobalExitRoot: true,
            permitData: Bytes::new(),
        };
        let data = call.abi_encode();
        // selector + 6 head words + empty bytes length word
        assert_eq!(data.len(), 4 + 32 * 7);
        assert_eq!(&data[..4], &IBridge::bridgeAssetCall::SELECTOR);
    }
}
